//! The trip record: one spreadsheet row, already rendered to text.
//!
//! Header names are matched exactly and case-sensitively. Two of them carry
//! misspellings (`END LOACTION`, `MOBIL NO`) that the upstream booking
//! spreadsheets have always used; they are kept as-is so existing files load.

use serde::{Deserialize, Serialize};

/// Header of the optional parking-fee column.
pub const PARKING_HEADER: &str = "PARKING";
/// Header of the optional toll-fee column.
pub const TOLL_HEADER: &str = "TOLL";

/// A required text column of the input sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    SequenceNo,
    Date,
    DutyType,
    GuestName,
    CabType,
    CabRegNo,
    DriverName,
    DriverMobile,
    PickupTime,
    StartLocation,
    EndLocation,
    EndTime,
    TotalHours,
    StartKm,
    EndKm,
    TotalKm,
}

impl Field {
    /// Every required column, in spreadsheet order.
    pub const ALL: [Field; 16] = [
        Field::SequenceNo,
        Field::Date,
        Field::DutyType,
        Field::GuestName,
        Field::CabType,
        Field::CabRegNo,
        Field::DriverName,
        Field::DriverMobile,
        Field::PickupTime,
        Field::StartLocation,
        Field::EndLocation,
        Field::EndTime,
        Field::TotalHours,
        Field::StartKm,
        Field::EndKm,
        Field::TotalKm,
    ];

    /// The exact header string used by the booking spreadsheets.
    pub fn header(self) -> &'static str {
        match self {
            Field::SequenceNo => "SL NO",
            Field::Date => "DATE",
            Field::DutyType => "DUTY TYPE",
            Field::GuestName => "EMP NAME",
            Field::CabType => "CAB TYPE",
            Field::CabRegNo => "CAB REG NO",
            Field::DriverName => "NAME",
            Field::DriverMobile => "MOBIL NO",
            Field::PickupTime => "PICKUP TIME",
            Field::StartLocation => "PLAND START",
            Field::EndLocation => "END LOACTION",
            Field::EndTime => "END TIME",
            Field::TotalHours => "TOTAL HRS SMT",
            Field::StartKm => "START KM",
            Field::EndKm => "END KM",
            Field::TotalKm => "SMT TOTAL KM",
        }
    }
}

/// One valid row of the input sheet.
///
/// Text fields hold the cell rendered as text; a missing or blank cell is the
/// empty string. Charges are already coerced to numbers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TripRecord {
    /// 1-based spreadsheet row number the record came from.
    pub row: usize,
    pub sequence_no: String,
    pub date: String,
    pub duty_type: String,
    pub guest_name: String,
    pub cab_type: String,
    pub cab_reg_no: String,
    pub driver_name: String,
    pub driver_mobile: String,
    pub pickup_time: String,
    pub start_location: String,
    pub end_location: String,
    pub end_time: String,
    pub total_hours: String,
    pub start_km: String,
    pub end_km: String,
    pub total_km: String,
    pub parking: f64,
    pub toll: f64,
}

impl TripRecord {
    /// Text value of a column.
    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::SequenceNo => &self.sequence_no,
            Field::Date => &self.date,
            Field::DutyType => &self.duty_type,
            Field::GuestName => &self.guest_name,
            Field::CabType => &self.cab_type,
            Field::CabRegNo => &self.cab_reg_no,
            Field::DriverName => &self.driver_name,
            Field::DriverMobile => &self.driver_mobile,
            Field::PickupTime => &self.pickup_time,
            Field::StartLocation => &self.start_location,
            Field::EndLocation => &self.end_location,
            Field::EndTime => &self.end_time,
            Field::TotalHours => &self.total_hours,
            Field::StartKm => &self.start_km,
            Field::EndKm => &self.end_km,
            Field::TotalKm => &self.total_km,
        }
    }

    /// Mutable access to a column, used while a row is being read.
    pub fn text_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::SequenceNo => &mut self.sequence_no,
            Field::Date => &mut self.date,
            Field::DutyType => &mut self.duty_type,
            Field::GuestName => &mut self.guest_name,
            Field::CabType => &mut self.cab_type,
            Field::CabRegNo => &mut self.cab_reg_no,
            Field::DriverName => &mut self.driver_name,
            Field::DriverMobile => &mut self.driver_mobile,
            Field::PickupTime => &mut self.pickup_time,
            Field::StartLocation => &mut self.start_location,
            Field::EndLocation => &mut self.end_location,
            Field::EndTime => &mut self.end_time,
            Field::TotalHours => &mut self.total_hours,
            Field::StartKm => &mut self.start_km,
            Field::EndKm => &mut self.end_km,
            Field::TotalKm => &mut self.total_km,
        }
    }

    /// Combined parking and toll charges.
    pub fn parking_plus_toll(&self) -> f64 {
        self.parking + self.toll
    }
}

//! Handover record types and the field schema.
//!
//! A handover record is fourteen optional free-text fields plus a
//! system-assigned identifier. [`Field`] is the single ordered list of those
//! fields; the form, the storage columns, the notification body, the listing
//! and the printed tables are all generated from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The part of the printed form a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Printed next to the record identifier above the tables.
    Header,
    /// The "Employee Information" table.
    Employee,
    /// The "Asset Information" table.
    Asset,
}

/// One named field of a handover record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Submission date as entered by the employee.
    Date,
    /// Employee full name.
    EmployeeName,
    /// National or residency (iqama) ID number.
    NationalId,
    /// Job title.
    JobTitle,
    /// Department or location.
    Department,
    /// Date the asset was received.
    AssetReceiptDate,
    /// Date the asset is due back.
    ReturnDate,
    /// Free-form notes.
    Notes,
    /// Name of the issued item.
    ItemName,
    /// Item model.
    Model,
    /// Item serial number.
    Serial,
    /// Item color.
    Color,
    /// Item condition at handover.
    Condition,
    /// Accessories handed over with the item.
    Accessories,
}

impl Field {
    /// Every field in schema order.
    pub const ALL: [Field; 14] = [
        Field::Date,
        Field::EmployeeName,
        Field::NationalId,
        Field::JobTitle,
        Field::Department,
        Field::AssetReceiptDate,
        Field::ReturnDate,
        Field::Notes,
        Field::ItemName,
        Field::Model,
        Field::Serial,
        Field::Color,
        Field::Condition,
        Field::Accessories,
    ];

    /// Form key and storage column name.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::EmployeeName => "employee_name",
            Self::NationalId => "national_id",
            Self::JobTitle => "job_title",
            Self::Department => "department",
            Self::AssetReceiptDate => "asset_receipt_date",
            Self::ReturnDate => "return_date",
            Self::Notes => "notes",
            Self::ItemName => "item_name",
            Self::Model => "model",
            Self::Serial => "serial",
            Self::Color => "color",
            Self::Condition => "condition",
            Self::Accessories => "accessories",
        }
    }

    /// Look up a field by form key. `iqama` names [`Field::NationalId`].
    #[must_use]
    pub fn from_key(key: &str) -> Option<Field> {
        if key == "iqama" {
            return Some(Field::NationalId);
        }
        Field::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Human-readable label used on pages and in the printed form.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::EmployeeName => "Employee Name",
            Self::NationalId => "ID / Iqama Number",
            Self::JobTitle => "Job Title",
            Self::Department => "Department",
            Self::AssetReceiptDate => "Asset Receipt Date",
            Self::ReturnDate => "Return Date",
            Self::Notes => "Notes",
            Self::ItemName => "Item Name",
            Self::Model => "Model",
            Self::Serial => "Serial Number",
            Self::Color => "Color",
            Self::Condition => "Condition",
            Self::Accessories => "Accessories",
        }
    }

    /// The printed section this field belongs to.
    #[must_use]
    pub fn section(self) -> Section {
        match self {
            Self::Date => Section::Header,
            Self::EmployeeName
            | Self::NationalId
            | Self::JobTitle
            | Self::Department
            | Self::AssetReceiptDate
            | Self::ReturnDate
            | Self::Notes => Section::Employee,
            Self::ItemName
            | Self::Model
            | Self::Serial
            | Self::Color
            | Self::Condition
            | Self::Accessories => Section::Asset,
        }
    }

    /// Whether the value is usually long enough to warrant a textarea.
    #[must_use]
    pub fn is_multiline(self) -> bool {
        matches!(self, Self::Notes | Self::Accessories)
    }

    /// Fields of one section, in schema order.
    pub fn in_section(section: Section) -> impl Iterator<Item = Field> {
        Self::ALL.into_iter().filter(move |f| f.section() == section)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// The user-supplied part of a handover record.
///
/// Form bodies go through [`HandoverFields::from_pairs`]; the serde impls
/// serve JSON output. Keys outside the schema are ignored and missing keys
/// become `None`. `iqama` is accepted for `national_id` so older forms keep
/// working.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverFields {
    /// See [`Field::Date`].
    pub date: Option<String>,
    /// See [`Field::EmployeeName`].
    pub employee_name: Option<String>,
    /// See [`Field::NationalId`].
    #[serde(alias = "iqama")]
    pub national_id: Option<String>,
    /// See [`Field::JobTitle`].
    pub job_title: Option<String>,
    /// See [`Field::Department`].
    pub department: Option<String>,
    /// See [`Field::AssetReceiptDate`].
    pub asset_receipt_date: Option<String>,
    /// See [`Field::ReturnDate`].
    pub return_date: Option<String>,
    /// See [`Field::Notes`].
    pub notes: Option<String>,
    /// See [`Field::ItemName`].
    pub item_name: Option<String>,
    /// See [`Field::Model`].
    pub model: Option<String>,
    /// See [`Field::Serial`].
    pub serial: Option<String>,
    /// See [`Field::Color`].
    pub color: Option<String>,
    /// See [`Field::Condition`].
    pub condition: Option<String>,
    /// See [`Field::Accessories`].
    pub accessories: Option<String>,
}

impl HandoverFields {
    /// Borrow the slot backing `field`.
    fn slot(&self, field: Field) -> &Option<String> {
        match field {
            Field::Date => &self.date,
            Field::EmployeeName => &self.employee_name,
            Field::NationalId => &self.national_id,
            Field::JobTitle => &self.job_title,
            Field::Department => &self.department,
            Field::AssetReceiptDate => &self.asset_receipt_date,
            Field::ReturnDate => &self.return_date,
            Field::Notes => &self.notes,
            Field::ItemName => &self.item_name,
            Field::Model => &self.model,
            Field::Serial => &self.serial,
            Field::Color => &self.color,
            Field::Condition => &self.condition,
            Field::Accessories => &self.accessories,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Date => &mut self.date,
            Field::EmployeeName => &mut self.employee_name,
            Field::NationalId => &mut self.national_id,
            Field::JobTitle => &mut self.job_title,
            Field::Department => &mut self.department,
            Field::AssetReceiptDate => &mut self.asset_receipt_date,
            Field::ReturnDate => &mut self.return_date,
            Field::Notes => &mut self.notes,
            Field::ItemName => &mut self.item_name,
            Field::Model => &mut self.model,
            Field::Serial => &mut self.serial,
            Field::Color => &mut self.color,
            Field::Condition => &mut self.condition,
            Field::Accessories => &mut self.accessories,
        }
    }

    /// Collect fields from raw form pairs.
    ///
    /// Unknown keys are skipped. When a field arrives more than once, under
    /// its own key or the `iqama` alias, the first value is kept.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut fields = Self::default();
        for (key, value) in pairs {
            if let Some(field) = Field::from_key(&key) {
                fields.slot_mut(field).get_or_insert(value);
            }
        }
        fields
    }

    /// Get the value of a field, if present.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Set the value of a field.
    pub fn set(&mut self, field: Field, value: Option<String>) {
        *self.slot_mut(field) = value;
    }

    /// Builder-style [`set`](Self::set) for a present value.
    #[must_use]
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, Some(value.into()));
        self
    }

    /// Treat empty values as absent.
    ///
    /// Browsers submit every input of a form, so a blank input arrives as an
    /// empty string. After normalizing, "blank" and "missing" are both `None`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        for field in Field::ALL {
            let slot = self.slot_mut(field);
            if slot.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *slot = None;
            }
        }
        self
    }

    /// Number of fields that carry a value.
    #[must_use]
    pub fn present_count(&self) -> usize {
        Field::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_some())
            .count()
    }
}

/// A stored handover record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverRecord {
    /// Identifier assigned by the storage layer.
    pub id: i64,
    /// When the record was stored. Absent for rows adopted from databases
    /// that predate the column.
    pub created_at: Option<DateTime<Utc>>,
    /// The submitted values.
    #[serde(flatten)]
    pub fields: HandoverFields,
}

impl HandoverRecord {
    /// Get the value of a field, if present.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(field)
    }

    /// Get the value of a field, or an empty string when absent.
    #[must_use]
    pub fn text(&self, field: Field) -> &str {
        self.get(field).unwrap_or_default()
    }
}

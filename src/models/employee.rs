//! Employee records and create/update DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::table::{SortKey, Tabular};

/// Employee gender as stored by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

/// Employment contract kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    #[default]
    Permanent,
    Contract,
    Intern,
}

impl ContractType {
    pub const ALL: [ContractType; 3] = [ContractType::Permanent, ContractType::Contract, ContractType::Intern];

    pub fn label(&self) -> &'static str {
        match self {
            ContractType::Permanent => "Permanent",
            ContractType::Contract => "Contract",
            ContractType::Intern => "Intern",
        }
    }

    /// Value used in query strings and filters.
    pub fn key(&self) -> &'static str {
        match self {
            ContractType::Permanent => "permanent",
            ContractType::Contract => "contract",
            ContractType::Intern => "intern",
        }
    }
}

/// Whether the employee is still employed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
}

impl EmployeeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "Active",
            EmployeeStatus::Inactive => "Inactive",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::Inactive => "inactive",
        }
    }
}

/// Employee as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub employee_code: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// 16-digit national identity number.
    pub nik: String,
    pub gender: Gender,
    #[serde(default)]
    pub birth_place: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub education: Option<String>,
    pub position: String,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub contract_type: ContractType,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub bank_account_number: Option<String>,
    #[serde(default)]
    pub bank_account_holder: Option<String>,
    pub join_date: NaiveDate,
    #[serde(default)]
    pub status: EmployeeStatus,
}

impl Employee {
    /// First and last name joined with a space.
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref().map(str::trim) {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

impl Tabular for Employee {
    fn matches_search(&self, needle: &str) -> bool {
        [
            self.full_name().as_str(),
            self.email.as_str(),
            self.employee_code.as_str(),
            self.nik.as_str(),
            self.position.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }

    fn filter_value(&self, key: &str) -> Option<String> {
        match key {
            "status" => Some(self.status.key().to_string()),
            "contract_type" => Some(self.contract_type.key().to_string()),
            "branch" => self.branch.clone(),
            _ => None,
        }
    }

    fn sort_key(&self, column: &str) -> SortKey {
        match column {
            "name" => SortKey::text(&self.full_name()),
            "employee_code" => SortKey::text(&self.employee_code),
            "email" => SortKey::text(&self.email),
            "position" => SortKey::text(&self.position),
            "join_date" => self.join_date.into(),
            _ => SortKey::Missing,
        }
    }
}

/// DTO for creating an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEmployee {
    /// Generated by the backend when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_code: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub nik: String,
    pub gender: Gender,
    pub birth_place: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub education: Option<String>,
    pub position: String,
    pub branch: Option<String>,
    pub grade: Option<String>,
    pub contract_type: ContractType,
    pub bank_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_account_holder: Option<String>,
    pub join_date: NaiveDate,
}

/// DTO for updating an employee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateEmployee {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nik: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_place: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<ContractType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account_number: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account_holder: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EmployeeStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Employee {
        serde_json::from_str(
            r#"{
                "id": 7,
                "employee_code": "EMP-007",
                "first_name": "Siti",
                "last_name": "Rahma",
                "email": "siti@example.com",
                "nik": "3201234567890001",
                "gender": "female",
                "position": "Accountant",
                "contract_type": "contract",
                "join_date": "2024-02-01"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let emp = sample();
        assert_eq!(emp.gender, Gender::Female);
        assert_eq!(emp.contract_type, ContractType::Contract);
        assert_eq!(emp.status, EmployeeStatus::Active);
        assert!(emp.phone.is_none());
    }

    #[test]
    fn test_full_name() {
        let mut emp = sample();
        assert_eq!(emp.full_name(), "Siti Rahma");

        emp.last_name = Some("  ".to_string());
        assert_eq!(emp.full_name(), "Siti");
    }

    #[test]
    fn test_update_skips_untouched_fields() {
        let update = UpdateEmployee {
            phone: Some(None),
            position: Some("Lead".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "phone": null, "position": "Lead" }));
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub department: String,
    pub position: String,
    pub salary: f64,
}

impl Employee {
    /// Salary formatted for list display, e.g. `$52,000`.
    pub fn salary_display(&self) -> String {
        format_salary(self.salary)
    }

    /// Editable fields, used to prefill an edit form.
    pub fn to_new(&self) -> NewEmployee {
        NewEmployee {
            name: self.name.clone(),
            department: self.department.clone(),
            position: self.position.clone(),
            salary: self.salary,
        }
    }
}

/// Body for creating or updating an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub name: String,
    pub department: String,
    pub position: String,
    pub salary: f64,
}

/// Filters for `GET /employees/search`. Blank filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeSearch {
    pub department: Option<String>,
    pub position: Option<String>,
}

impl EmployeeSearch {
    pub fn is_empty(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        blank(&self.department) && blank(&self.position)
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if let Some(ref department) = self.department {
            pairs.push(("department", department.as_str()));
        }
        if let Some(ref position) = self.position {
            pairs.push(("position", position.as_str()));
        }
        pairs
    }
}

fn format_salary(salary: f64) -> String {
    let whole = salary.round().max(0.0) as u64;
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("${}", out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_employee_with_mongo_id() {
        let json = r#"{"_id": "65a1f0c2e4b0a1b2c3d4e5f6", "name": "Ada Lovelace", "department": "Engineering", "position": "Analyst", "salary": 52000, "__v": 0}"#;
        let employee: Employee = serde_json::from_str(json).expect("parse employee");
        assert_eq!(employee.id, "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(employee.salary, 52000.0);
        assert_eq!(employee.salary_display(), "$52,000");
    }

    #[test]
    fn test_new_employee_has_no_id() {
        let employee = NewEmployee {
            name: "Grace".to_string(),
            department: "Navy".to_string(),
            position: "Rear Admiral".to_string(),
            salary: 1234567.0,
        };
        let value = serde_json::to_value(&employee).expect("encode");
        assert!(value.get("_id").is_none());
        assert_eq!(value["salary"], 1234567.0);
    }

    #[test]
    fn test_format_salary() {
        assert_eq!(format_salary(0.0), "$0");
        assert_eq!(format_salary(999.0), "$999");
        assert_eq!(format_salary(1000.0), "$1,000");
        assert_eq!(format_salary(1234567.4), "$1,234,567");
    }

    #[test]
    fn test_search_is_empty() {
        assert!(EmployeeSearch::default().is_empty());
        assert!(EmployeeSearch {
            department: Some("  ".to_string()),
            position: None,
        }
        .is_empty());
        assert!(!EmployeeSearch {
            department: None,
            position: Some("Manager".to_string()),
        }
        .is_empty());
    }
}

//! Employee directory endpoints.

use crate::models::{Employee, EmployeeSearch, NewEmployee};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Fetch every employee
    pub async fn list_employees(&self) -> Result<Vec<Employee>, ApiError> {
        self.get("/employees").await
    }

    /// Search by department and/or position. An empty search lists everyone.
    pub async fn search_employees(&self, search: &EmployeeSearch) -> Result<Vec<Employee>, ApiError> {
        if search.is_empty() {
            return self.list_employees().await;
        }
        self.get_with_query("/employees/search", &search.query_pairs())
            .await
    }

    pub async fn get_employee(&self, id: &str) -> Result<Employee, ApiError> {
        self.get(&employee_path(id)?).await
    }

    pub async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee, ApiError> {
        self.post("/employees", employee).await
    }

    pub async fn update_employee(&self, id: &str, employee: &NewEmployee) -> Result<Employee, ApiError> {
        self.put(&employee_path(id)?, employee).await
    }
}

fn employee_path(id: &str) -> Result<String, ApiError> {
    let id = id.trim();
    if id.is_empty() || id.contains('/') {
        return Err(ApiError::InvalidRequest(format!("Invalid employee id: {:?}", id)));
    }
    Ok(format!("/employees/{}", id))
}

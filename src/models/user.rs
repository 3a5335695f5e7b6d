//! User model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::AppError;

use super::loan::LoanDto;

/// User row from the directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
}

/// User as exposed over the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub user_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// Only filled in by the relay's aggregated views
    pub loans: Option<Vec<LoanDto>>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            user_name: user.username,
            first_name: user.firstname,
            last_name: user.lastname,
            email: user.email,
            loans: None,
        }
    }
}

/// Sortable user columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UserSortKey {
    UserName,
    #[default]
    FirstName,
    LastName,
    Email,
}

impl UserSortKey {
    /// Column used in ORDER BY
    pub fn column(&self) -> &'static str {
        match self {
            UserSortKey::UserName => "u.username",
            UserSortKey::FirstName => "u.firstname",
            UserSortKey::LastName => "u.lastname",
            UserSortKey::Email => "u.email",
        }
    }
}

impl std::str::FromStr for UserSortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "").as_str() {
            "username" => Ok(UserSortKey::UserName),
            "firstname" => Ok(UserSortKey::FirstName),
            "lastname" => Ok(UserSortKey::LastName),
            "email" => Ok(UserSortKey::Email),
            _ => Err(AppError::Validation(format!(
                "Invalid sortBy '{}', expected one of: userName, firstName, lastName, email",
                s
            ))),
        }
    }
}

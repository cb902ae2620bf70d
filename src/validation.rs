//! Request validation rules. Each rule records at most one message per field so
//! the client gets a `{field: message}` map back with a 400.

use std::collections::{BTreeMap, BTreeSet};

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref USERNAME_RE: Regex = Regex::new(r"^[a-zA-Z0-9_]+$").unwrap();
}

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn into_fields(self) -> BTreeMap<String, String> {
        self.fields
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

fn length_between(value: &str, min: usize, max: usize) -> bool {
    let n = value.chars().count();
    (min..=max).contains(&n)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn check_username(errors: &mut ValidationErrors, username: &str) {
    if username.trim().is_empty() {
        errors.add("username", "Username is required");
    } else if !length_between(username, 3, 50) {
        errors.add("username", "Username must be between 3 and 50 characters");
    } else if !USERNAME_RE.is_match(username) {
        errors.add(
            "username",
            "Username can only contain letters, numbers, and underscores",
        );
    }
}

pub fn check_full_name(errors: &mut ValidationErrors, full_name: &str) {
    let trimmed = full_name.trim();
    if trimmed.is_empty() {
        errors.add("fullName", "Full name is required");
    } else if !length_between(trimmed, 2, 100) {
        errors.add("fullName", "Full name must be between 2 and 100 characters");
    }
}

pub fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.trim().is_empty() {
        errors.add("email", "Email is required");
    } else if !is_valid_email(email) {
        errors.add("email", "Invalid email format");
    } else if !length_between(email, 5, 255) {
        errors.add("email", "Email must be between 5 and 255 characters");
    }
}

pub fn check_password(errors: &mut ValidationErrors, password: &str) {
    if password.is_empty() {
        errors.add("password", "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add("password", "Password must be at least 6 characters");
    }
}

/// Hobby names must be 2–100 characters, not blank, and unique within the
/// list (case-sensitive, after trimming).
pub fn check_hobby_names<'a>(
    errors: &mut ValidationErrors,
    names: impl IntoIterator<Item = &'a str>,
) {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for (i, name) in names.into_iter().enumerate() {
        let field = format!("hobbies[{i}].name");
        let trimmed = name.trim();
        if trimmed.is_empty() {
            errors.add(field, "Hobby name cannot be empty or contain only whitespace");
            continue;
        }
        if !length_between(trimmed, 2, 100) {
            errors.add(field, "Hobby name must be between 2 and 100 characters");
        }
        if !seen.insert(trimmed) {
            duplicates.insert(trimmed);
        }
    }
    if !duplicates.is_empty() {
        let list: Vec<&str> = duplicates.into_iter().collect();
        errors.add(
            "hobbies",
            format!(
                "Duplicate hobbies found: {}. Each hobby name must be unique (case-sensitive).",
                list.join(", ")
            ),
        );
    }
}

pub fn check_positive_id(errors: &mut ValidationErrors, field: &str, label: &str, id: i64) {
    if id <= 0 {
        errors.add(field, format!("{label} must be greater than 0"));
    }
}

/// A single personnel record from the directory source.
///
/// `name` and `department` are guaranteed non-empty after loading;
/// rows that fail that invariant are dropped by the loader, not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub name: String,
    pub department: String,
    pub position: Option<String>,
    pub contact: Option<String>,
}

impl Employee {
    pub fn new(name: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            department: department.into(),
            position: None,
            contact: None,
        }
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }

    /// One-line rendering for chat replies.
    pub fn display_line(&self) -> String {
        let mut line = format!("- {}", self.name);
        if let Some(ref position) = self.position {
            line.push_str(&format!(" — {}", position));
        }
        line.push_str(&format!(" ({})", self.department));
        if let Some(ref contact) = self.contact {
            line.push_str(&format!("\n  contact: {}", contact));
        }
        line
    }
}

/// Normalized key for department equality: lowercased, inner whitespace
/// collapsed. Two spellings of the same department compare equal through it.
pub fn department_key(name: &str) -> String {
    name.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_key_folds_case_and_spacing() {
        assert_eq!(department_key("  Sales   Team "), "sales team");
        assert_eq!(department_key("SALES TEAM"), department_key("sales team"));
    }

    #[test]
    fn display_line_includes_optional_fields() {
        let e = Employee::new("Ivan Petrov", "Sales")
            .with_position("Manager")
            .with_contact("ivan@example.com");
        let line = e.display_line();
        assert!(line.contains("Ivan Petrov — Manager (Sales)"));
        assert!(line.contains("contact: ivan@example.com"));
    }
}

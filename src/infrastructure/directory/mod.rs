//! Directory store - loads personnel records and owns the search snapshot
//!
//! The source is delimited text with a header row; column order does not
//! matter. Rows missing a name or department are dropped and counted, never
//! fatal. A missing or unreadable file at startup is fatal - the process
//! must not serve with no directory loaded.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::application::errors::LoadError;
use crate::application::services::search::SearchIndex;
use crate::domain::entities::{department_key, Employee};

/// One immutable view over the loaded directory. Reloads build a new
/// snapshot and swap the Arc; readers keep whatever they already cloned.
#[derive(Debug)]
pub struct DirectorySnapshot {
    pub index: SearchIndex,
    /// Department display names, first-seen spelling, sorted.
    pub departments: Vec<String>,
    /// Rows dropped during the load that produced this snapshot.
    pub skipped_rows: usize,
}

impl DirectorySnapshot {
    fn build(employees: Vec<Employee>, skipped_rows: usize) -> Self {
        let mut departments: Vec<String> = Vec::new();
        let mut seen_keys: Vec<String> = Vec::new();
        for employee in &employees {
            let key = department_key(&employee.department);
            if !seen_keys.contains(&key) {
                seen_keys.push(key);
                departments.push(employee.department.trim().to_string());
            }
        }
        departments.sort();

        Self {
            index: SearchIndex::build(employees),
            departments,
            skipped_rows,
        }
    }

    /// Employees whose department matches the filter (normalized substring,
    /// like the /staff command expects). An empty filter returns everyone.
    pub fn staff(&self, department_filter: &str) -> Vec<&Employee> {
        let needle = department_key(department_filter);
        self.index
            .employees()
            .iter()
            .filter(|e| needle.is_empty() || department_key(&e.department).contains(&needle))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.index.employees().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Owns the current directory snapshot and the path it came from.
#[derive(Debug)]
pub struct DirectoryStore {
    path: PathBuf,
    snapshot: RwLock<Arc<DirectorySnapshot>>,
}

impl DirectoryStore {
    /// Load the directory from a delimited-text file. Errors here are the
    /// fatal startup class.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let path = path.into();
        let snapshot = load_snapshot(&path)?;
        Ok(Self {
            path,
            snapshot: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// Build a store straight from records, bypassing file IO. Used by
    /// tests and anything that already has employees in hand.
    pub fn from_employees(employees: Vec<Employee>) -> Self {
        Self {
            path: PathBuf::new(),
            snapshot: RwLock::new(Arc::new(DirectorySnapshot::build(employees, 0))),
        }
    }

    /// Rebuild the snapshot from the source file and swap it in atomically.
    /// Concurrent readers keep their old Arc until they ask again.
    pub fn reload(&self) -> Result<(), LoadError> {
        let fresh = Arc::new(load_snapshot(&self.path)?);
        match self.snapshot.write() {
            Ok(mut guard) => *guard = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }
        Ok(())
    }

    /// The current snapshot. Cheap Arc clone; never blocks on a reload
    /// longer than the pointer swap itself.
    pub fn snapshot(&self) -> Arc<DirectorySnapshot> {
        match self.snapshot.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }
}

fn load_snapshot(path: &Path) -> Result<DirectorySnapshot, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::Unavailable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let (employees, skipped) = parse_directory(&content).map_err(|e| match e {
        LoadError::Malformed { reason, .. } => LoadError::Malformed {
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })?;
    if skipped > 0 {
        tracing::warn!(
            path = %path.display(),
            skipped,
            "dropped malformed directory rows"
        );
    }
    tracing::info!(
        path = %path.display(),
        employees = employees.len(),
        "directory loaded"
    );
    Ok(DirectorySnapshot::build(employees, skipped))
}

/// Parse delimited text with a header row into employees plus a count of
/// dropped rows. The delimiter is sniffed from the header (';' beats ','
/// beats tab). Double-quoted fields may contain the delimiter.
pub fn parse_directory(content: &str) -> Result<(Vec<Employee>, usize), LoadError> {
    let mut lines = content.lines().filter(|l| !l.trim().is_empty());
    let header_line = lines.next().ok_or_else(|| LoadError::Malformed {
        path: String::new(),
        reason: "empty directory source".to_string(),
    })?;
    let delimiter = sniff_delimiter(header_line);

    let header: Vec<String> = split_row(header_line, delimiter)
        .into_iter()
        .map(|c| c.trim().to_lowercase())
        .collect();
    let name_col = column(&header, "name")?;
    let dept_col = column(&header, "department")?;
    let position_col = header.iter().position(|c| c == "position");
    let contact_col = header.iter().position(|c| c == "contact");
    // The original source files split contact into email/phone columns.
    let email_col = header.iter().position(|c| c == "email");
    let phone_col = header.iter().position(|c| c == "phone");

    let mut employees = Vec::new();
    let mut skipped = 0usize;
    for line in lines {
        let fields = split_row(line, delimiter);
        let field = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| fields.get(i))
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
        };

        let name = field(Some(name_col));
        let department = field(Some(dept_col));
        let (Some(name), Some(department)) = (name, department) else {
            skipped += 1;
            continue;
        };

        let mut employee = Employee::new(name, department);
        if let Some(position) = field(position_col) {
            employee = employee.with_position(position);
        }
        let contact = field(contact_col).or_else(|| {
            match (field(email_col), field(phone_col)) {
                (Some(email), Some(phone)) => Some(format!("{}, {}", email, phone)),
                (Some(one), None) | (None, Some(one)) => Some(one),
                (None, None) => None,
            }
        });
        if let Some(contact) = contact {
            employee = employee.with_contact(contact);
        }
        employees.push(employee);
    }

    Ok((employees, skipped))
}

fn column(header: &[String], name: &str) -> Result<usize, LoadError> {
    header
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
}

fn sniff_delimiter(header: &str) -> char {
    if header.contains(';') {
        ';'
    } else if header.contains(',') {
        ','
    } else {
        '\t'
    }
}

fn split_row(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
name,department,position,email,phone
Ivan Petrov,Sales,Sales Manager,ivan@acme.example,+7 900 000-00-01
Irina Ivanova,Marketing,Designer,irina@acme.example,
,Sales,Orphan Row,orphan@acme.example,
Oleg Arsipov,Engineering,,,
";

    #[test]
    fn parses_rows_and_drops_invalid_ones() {
        let (employees, skipped) = parse_directory(SAMPLE).expect("parse");
        assert_eq!(employees.len(), 3);
        assert_eq!(skipped, 1);
        assert_eq!(employees[0].name, "Ivan Petrov");
        assert_eq!(
            employees[0].contact.as_deref(),
            Some("ivan@acme.example, +7 900 000-00-01")
        );
        assert_eq!(employees[1].contact.as_deref(), Some("irina@acme.example"));
        assert!(employees[2].position.is_none());
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let err = parse_directory("name,position\nIvan,Manager\n").unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(c) if c == "department"));
    }

    #[test]
    fn semicolon_delimiter_is_sniffed_from_the_header() {
        let (employees, skipped) =
            parse_directory("name;department\nIvan Petrov;Sales\n").expect("parse");
        assert_eq!(skipped, 0);
        assert_eq!(employees[0].department, "Sales");
    }

    #[test]
    fn quoted_field_may_contain_the_delimiter() {
        let (employees, _) =
            parse_directory("name,department\n\"Petrov, Ivan\",Sales\n").expect("parse");
        assert_eq!(employees[0].name, "Petrov, Ivan");
    }

    #[test]
    fn snapshot_collects_departments_once_ignoring_case() {
        let store = DirectoryStore::from_employees(vec![
            Employee::new("A", "Sales"),
            Employee::new("B", "SALES"),
            Employee::new("C", "Marketing"),
        ]);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.departments, vec!["Marketing", "Sales"]);
    }

    #[test]
    fn staff_filter_matches_normalized_substring() {
        let store = DirectoryStore::from_employees(vec![
            Employee::new("A", "Sales Team"),
            Employee::new("B", "Marketing"),
        ]);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.staff("sales").len(), 1);
        assert_eq!(snapshot.staff("").len(), 2);
    }

    #[test]
    fn open_fails_when_the_source_is_missing() {
        let err = DirectoryStore::open("/nonexistent/employees.csv").unwrap_err();
        assert!(matches!(err, LoadError::Unavailable { .. }));
    }

    #[test]
    fn reload_swaps_in_a_fresh_snapshot() {
        let path = std::env::temp_dir().join(format!("directory-reload-{}.csv", std::process::id()));
        std::fs::write(&path, "name,department\nIvan Petrov,Sales\n").expect("write");
        let store = DirectoryStore::open(&path).expect("open");
        let before = store.snapshot();
        assert_eq!(before.len(), 1);

        std::fs::write(
            &path,
            "name,department\nIvan Petrov,Sales\nIrina Ivanova,Marketing\n",
        )
        .expect("write");
        store.reload().expect("reload");

        assert_eq!(store.snapshot().len(), 2);
        // A reader holding the old snapshot keeps seeing it.
        assert_eq!(before.len(), 1);
        let _ = std::fs::remove_file(&path);
    }
}

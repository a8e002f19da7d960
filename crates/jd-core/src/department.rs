//! The fixed department enumeration. Order matters for statistics.

pub const DEPARTMENTS: [&str; 10] = [
    "Water Supply",
    "Electricity",
    "Health",
    "Education",
    "Sanitation",
    "Public Works",
    "Transportation",
    "Housing",
    "Finance",
    "Administration",
];

/// Exact, case-sensitive membership test.
#[must_use]
pub fn is_known_department(name: &str) -> bool {
    DEPARTMENTS.contains(&name)
}

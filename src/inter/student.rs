/*!
Student dashboard.
*/
use serde::Serialize;

use crate::{
    catalog::Catalog,
    course::{Assignment, Course},
    user::Identity,
};

/// There's no enrollment record anywhere, so every student is "enrolled"
/// in this many courses off the front of the catalog.
const DEMO_ENROLLMENT_COUNT: usize = 2;

#[derive(Debug, Serialize)]
pub struct StudentData<'a> {
    pub name: &'a str,
    pub enrolled: Vec<&'a Course>,
    pub assignments: Vec<&'a Assignment>,
    /// Featured courses not already enrolled in.
    pub recommended: Vec<&'a Course>,
}

pub fn dashboard_data<'a>(catalog: &'a Catalog, ident: &'a Identity) -> StudentData<'a> {
    log::trace!("student::dashboard_data( [ Catalog ], {:?} ) called.", &ident.email);

    let enrolled: Vec<&Course> = catalog.courses().iter()
        .take(DEMO_ENROLLMENT_COUNT)
        .collect();

    let mut assignments: Vec<&Assignment> = enrolled.iter()
        .flat_map(|c| catalog.assignments_by_course(&c.id))
        .collect();
    assignments.sort_by_key(|a| a.due);

    let recommended = catalog.featured().into_iter()
        .filter(|c| !enrolled.iter().any(|e| e.id == c.id))
        .collect();

    StudentData {
        name: &ident.name,
        enrolled,
        assignments,
        recommended,
    }
}

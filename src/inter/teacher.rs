/*!
Teacher dashboard.
*/
use serde::Serialize;

use crate::{
    catalog::Catalog,
    course::Course,
    user::Identity,
};

#[derive(Debug, Serialize)]
pub struct TeacherData<'a> {
    pub name: &'a str,
    pub courses: Vec<&'a Course>,
    pub course_count: usize,
    pub total_students: u32,
    pub total_assignments: usize,
    pub average_rating: Option<f32>,
    /// `average_rating` to one decimal place, or "-" with no courses.
    pub rating_text: String,
}

pub fn dashboard_data<'a>(catalog: &'a Catalog, ident: &'a Identity) -> TeacherData<'a> {
    log::trace!("teacher::dashboard_data( [ Catalog ], {:?} ) called.", &ident.id);

    let courses = catalog.courses_by_instructor(&ident.id);
    let total_students = courses.iter().map(|c| c.enrolled_students).sum();
    let total_assignments = courses.iter()
        .map(|c| catalog.assignments_by_course(&c.id).len())
        .sum();

    let average_rating = match courses.len() {
        0 => None,
        n => Some(courses.iter().map(|c| c.rating).sum::<f32>() / n as f32),
    };
    let rating_text = match average_rating {
        Some(r) => format!("{:.1}", r),
        None => "-".to_owned(),
    };

    TeacherData {
        name: &ident.name,
        course_count: courses.len(),
        courses,
        total_students,
        total_assignments,
        average_rating,
        rating_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{mock_identities, Role};

    use float_cmp::approx_eq;

    #[test]
    fn teacher_dashboard() {
        let catalog = Catalog::mock();
        let ident = &mock_identities()[1];
        let data = dashboard_data(&catalog, ident);

        let ids: Vec<&str> = data.courses.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["course-1", "course-3"]);
        assert_eq!(data.course_count, 2);
        assert_eq!(data.total_students, 246 + 189);
        assert_eq!(data.total_assignments, 2);
        assert!(approx_eq!(f32, data.average_rating.unwrap(), 4.85, epsilon = 0.0001));
    }

    #[test]
    fn teacher_with_no_courses() {
        let catalog = Catalog::mock();
        let ident = Identity {
            id: "user-1-abcd".to_owned(),
            name: "New Teacher".to_owned(),
            email: "new@x.com".to_owned(),
            role: Role::Teacher,
            avatar: None,
        };
        let data = dashboard_data(&catalog, &ident);
        assert!(data.courses.is_empty());
        assert_eq!(data.total_students, 0);
        assert_eq!(data.average_rating, None);
        assert_eq!(data.rating_text, "-");
    }
}

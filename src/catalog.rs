/*!
Read-only accessors over the course and assignment collections.
*/
use crate::course::{Assignment, Course, Level, mock_assignments, mock_courses};

/// Browse-view constraints.
///
/// An empty `query` and `None` constraints match everything.
#[derive(Clone, Debug, Default)]
pub struct CatalogFilter {
    pub query: String,
    pub category: Option<String>,
    pub level: Option<Level>,
}

impl CatalogFilter {
    pub fn matches(&self, crs: &Course) -> bool {
        let q = self.query.to_lowercase();
        let text_ok = q.is_empty()
            || crs.title.to_lowercase().contains(&q)
            || crs.description.to_lowercase().contains(&q);

        let category_ok = match &self.category {
            Some(cat) => &crs.category == cat,
            None => true,
        };
        let level_ok = match &self.level {
            Some(lvl) => &crs.level == lvl,
            None => true,
        };

        text_ok && category_ok && level_ok
    }
}

#[derive(Debug)]
pub struct Catalog {
    courses: Vec<Course>,
    assignments: Vec<Assignment>,
}

impl Catalog {
    pub fn new(courses: Vec<Course>, assignments: Vec<Assignment>) -> Self {
        log::trace!(
            "Catalog::new( [ {} courses ], [ {} assignments ] ) called.",
            courses.len(), assignments.len()
        );
        Self { courses, assignments }
    }

    pub fn mock() -> Self {
        Self::new(mock_courses(), mock_assignments())
    }

    pub fn courses(&self) -> &[Course] { &self.courses }

    pub fn assignments(&self) -> &[Assignment] { &self.assignments }

    pub fn featured(&self) -> Vec<&Course> {
        self.courses.iter().filter(|c| c.featured).collect()
    }

    pub fn course_by_id(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    pub fn courses_by_instructor(&self, instructor_id: &str) -> Vec<&Course> {
        self.courses.iter()
            .filter(|c| c.instructor_id == instructor_id)
            .collect()
    }

    pub fn assignments_by_course(&self, course_id: &str) -> Vec<&Assignment> {
        self.assignments.iter()
            .filter(|a| a.course_id == course_id)
            .collect()
    }

    pub fn filter(&self, f: &CatalogFilter) -> Vec<&Course> {
        log::trace!("Catalog::filter( {:?} ) called.", f);
        self.courses.iter().filter(|c| f.matches(c)).collect()
    }

    /// Distinct categories in the order they first appear.
    pub fn categories(&self) -> Vec<&str> {
        let mut cats: Vec<&str> = Vec::new();
        for crs in self.courses.iter() {
            if !cats.contains(&crs.category.as_str()) {
                cats.push(&crs.category);
            }
        }
        cats
    }

    pub fn levels(&self) -> [Level; 3] { Level::ALL }
}

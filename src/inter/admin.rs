/*!
Admin dashboard: site-wide totals.
*/
use serde::Serialize;

use crate::{
    catalog::Catalog,
    course::Course,
    user::{Directory, Identity, Role},
};

#[derive(Debug, Serialize)]
pub struct RoleCount {
    pub role: Role,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct AdminData<'a> {
    pub name: &'a str,
    pub total_courses: usize,
    pub featured_courses: usize,
    pub total_enrollments: u32,
    pub categories: Vec<&'a str>,
    pub category_count: usize,
    pub total_users: usize,
    pub users_by_role: Vec<RoleCount>,
    pub users: &'a [Identity],
    pub courses: &'a [Course],
}

pub fn dashboard_data<'a>(
    catalog: &'a Catalog,
    directory: &'a Directory,
    ident: &'a Identity,
) -> AdminData<'a> {
    log::trace!(
        "admin::dashboard_data( [ Catalog ], [ {} identities ], {:?} ) called.",
        directory.len(), &ident.email
    );

    let users_by_role = Role::ALL.iter()
        .map(|r| RoleCount { role: *r, count: directory.count_role(*r) })
        .collect();

    let categories = catalog.categories();

    AdminData {
        name: &ident.name,
        total_courses: catalog.courses().len(),
        featured_courses: catalog.featured().len(),
        total_enrollments: catalog.courses().iter().map(|c| c.enrolled_students).sum(),
        category_count: categories.len(),
        categories,
        total_users: directory.len(),
        users_by_role,
        users: directory.identities(),
        courses: catalog.courses(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::mock_identities;

    #[test]
    fn admin_dashboard() {
        let catalog = Catalog::mock();
        let directory = Directory::mock();
        let ident = &mock_identities()[2];
        let data = dashboard_data(&catalog, &directory, ident);

        assert_eq!(data.name, "Admin User");
        assert_eq!(data.total_courses, 5);
        assert_eq!(data.featured_courses, 3);
        assert_eq!(data.total_enrollments, 246 + 352 + 189 + 275 + 210);
        assert_eq!(data.category_count, 4);
        assert_eq!(data.total_users, 3);
        for rc in data.users_by_role.iter() {
            assert_eq!(rc.count, 1, "{} count", &rc.role);
        }
    }
}

/*!
Interoperation between the client (user) and the application.

Page handlers, the router that ties them together, and the bits of
template plumbing they share. Dashboard page data lives in the role
submodules.
*/
use std::{
    fmt::Debug,
    path::Path,
    sync::Arc,
};

use axum::{
    extract::{Extension, Form, Path as UrlPath, Query},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::services::ServeDir;

use crate::{
    catalog::{Catalog, CatalogFilter},
    config::Glob,
    course::{Assignment, Course, Level},
    guard::{self, Outcome},
    route::Route,
    session::{AuthError, Notice},
    user::{Identity, Role},
};

pub mod admin;
pub mod student;
pub mod teacher;

pub type SharedGlob = Arc<RwLock<Glob>>;

static HTML_500: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>lms | Error</title>
<link rel="stylesheet" href="/static/lms.css">
</head>
<body>
<h1>Internal Server Error</h1>
<p>(Error 500)</p>
<p>Something went wrong on our end. No further or more
helpful information is available about the problem.</p>
</body>
</html>"#;

/**
Return an HTML response in the case of an unrecoverable* error.

(*"Unrecoverable" from the perspective of fielding the current request,
not from the perspective of the program crashing.)
*/
pub fn html_500() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(HTML_500)
    ).into_response()
}

pub fn respond_bad_request(msg: String) -> Response {
    log::trace!("respond_bad_request( {:?} ) called.", &msg);

    (
        StatusCode::BAD_REQUEST,
        msg
    ).into_response()
}

pub fn redirect(route: &Route) -> Response {
    log::trace!("redirect( {:?} ) called.", route);
    Redirect::to(&route.path()).into_response()
}

/// Wrapper that every page template gets: the navbar needs the identity,
/// and any pending notices get shown at the top.
#[derive(Debug, Serialize)]
pub struct Page<'a, D: Serialize + Debug> {
    pub identity: Option<&'a Identity>,
    pub notices: Vec<Notice>,
    pub data: D,
}

pub fn serve_template<S>(
    templates: &Handlebars,
    code: StatusCode,
    template_name: &str,
    data: &S,
) -> Response
where
    S: Serialize + Debug
{
    log::trace!("serve_template( {}, {:?}, ... ) called.", &code, template_name);

    match templates.render(template_name, data) {
        Ok(response_body) => (
            code,
            Html(response_body)
        ).into_response(),
        Err(e) => {
            log::error!(
                "Error rendering template {:?} with data {:?}:\n{}",
                template_name, data, &e
            );
            html_500()
        },
    }
}

/// Render a full page, draining whatever notices have piled up. `build`
/// makes the page-specific data once the notices are out of the way.
fn serve_page<'g, D, F>(
    glob: &'g mut Glob,
    code: StatusCode,
    template_name: &str,
    extra_notices: Vec<Notice>,
    build: F,
) -> Response
where
    D: Serialize + Debug,
    F: FnOnce(&'g Glob) -> D,
{
    let mut notices = glob.take_notices();
    notices.extend(extra_notices);

    let glob: &'g Glob = glob;
    let page = Page {
        identity: glob.sessions.identity(),
        notices,
        data: build(glob),
    };
    serve_template(&glob.templates, code, template_name, &page)
}

#[derive(Debug, Serialize)]
pub struct LandingData<'a> {
    pub featured: Vec<&'a Course>,
}

pub fn landing_data(catalog: &Catalog) -> LandingData<'_> {
    LandingData { featured: catalog.featured() }
}

/// Query string of the browse page. Blank values mean "no constraint".
#[derive(Debug, Default, Deserialize)]
pub struct CourseQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
}

fn blank_means_none(s: &Option<String>) -> Option<&str> {
    match s {
        Some(s) => match s.trim() {
            "" => None,
            x => Some(x),
        },
        None => None,
    }
}

impl CourseQuery {
    /// An unrecognizable level is ignored rather than matching nothing.
    pub fn to_filter(&self) -> CatalogFilter {
        let level = match blank_means_none(&self.level) {
            Some(s) => match s.parse::<Level>() {
                Ok(lvl) => Some(lvl),
                Err(e) => {
                    log::debug!("Ignoring level constraint: {}", &e);
                    None
                },
            },
            None => None,
        };

        CatalogFilter {
            query: blank_means_none(&self.q).unwrap_or("").to_owned(),
            category: blank_means_none(&self.category).map(|s| s.to_owned()),
            level,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CoursesData<'a> {
    pub courses: Vec<&'a Course>,
    pub categories: Vec<&'a str>,
    pub levels: [Level; 3],
    pub query: String,
    pub category: Option<String>,
    pub level: Option<Level>,
}

pub fn courses_data<'a>(catalog: &'a Catalog, q: &CourseQuery) -> CoursesData<'a> {
    let filter = q.to_filter();
    CoursesData {
        courses: catalog.filter(&filter),
        categories: catalog.categories(),
        levels: catalog.levels(),
        query: filter.query,
        category: filter.category,
        level: filter.level,
    }
}

#[derive(Debug, Serialize)]
pub struct CourseData<'a> {
    pub course: &'a Course,
    pub assignments: Vec<&'a Assignment>,
    pub total_points: u32,
}

pub fn course_data<'a>(catalog: &'a Catalog, id: &str) -> Option<CourseData<'a>> {
    let course = catalog.course_by_id(id)?;
    let assignments = catalog.assignments_by_course(id);
    let total_points = assignments.iter().map(|a| a.points).sum();
    Some(CourseData { course, assignments, total_points })
}

#[derive(Debug, Serialize)]
pub struct FormData {
    pub name: String,
    pub email: String,
    pub role: String,
    pub password_error: Option<String>,
    pub roles: [&'static str; 3],
}

impl FormData {
    fn new(name: &str, email: &str, role: &str) -> Self {
        Self {
            name: name.to_owned(),
            email: email.to_owned(),
            role: role.to_owned(),
            password_error: None,
            roles: Role::ALL.map(|r| r.as_str()),
        }
    }
}

/// Form data from the login page.
#[derive(Debug, Deserialize)]
pub struct LoginData {
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Form data from the registration page.
#[derive(Debug, Deserialize)]
pub struct RegisterData {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: String,
}

fn auth_error_status(e: &AuthError) -> StatusCode {
    match e {
        AuthError::Validation(_) => StatusCode::BAD_REQUEST,
        AuthError::Credential => StatusCode::UNAUTHORIZED,
        AuthError::Duplicate => StatusCode::CONFLICT,
    }
}


pub async fn landing(
    Extension(glob): Extension<SharedGlob>
) -> Response {
    log::trace!("landing() called.");

    let mut glob = glob.write().await;
    serve_page(&mut glob, StatusCode::OK, "landing", vec![], |g| {
        landing_data(&g.catalog)
    })
}

pub async fn courses(
    Query(q): Query<CourseQuery>,
    Extension(glob): Extension<SharedGlob>
) -> Response {
    log::trace!("courses( {:?} ) called.", &q);

    let mut glob = glob.write().await;
    serve_page(&mut glob, StatusCode::OK, "courses", vec![], |g| {
        courses_data(&g.catalog, &q)
    })
}

/// Detail page, or the "Course Not Found" version of it. `extra` notices
/// only get shown if the course exists.
fn serve_course(glob: &mut Glob, id: &str, extra: Vec<Notice>) -> Response {
    let (code, extra) = match glob.catalog.course_by_id(id) {
        Some(_) => (StatusCode::OK, extra),
        None => {
            log::debug!("No course with id {:?}.", id);
            (StatusCode::NOT_FOUND, vec![])
        },
    };
    serve_page(glob, code, "course", extra, |g| course_data(&g.catalog, id))
}

pub async fn course_detail(
    UrlPath(id): UrlPath<String>,
    Extension(glob): Extension<SharedGlob>
) -> Response {
    log::trace!("course_detail( {:?} ) called.", &id);

    let mut glob = glob.write().await;
    serve_course(&mut glob, &id, vec![])
}

/// Nobody actually gets enrolled in anything; this just confirms.
pub async fn enroll(
    UrlPath(id): UrlPath<String>,
    Extension(glob): Extension<SharedGlob>
) -> Response {
    log::trace!("enroll( {:?} ) called.", &id);

    let mut glob = glob.write().await;
    let title = glob.catalog.course_by_id(&id).map(|crs| crs.title.clone());
    let title = match title {
        Some(title) => title,
        None => { return serve_course(&mut glob, &id, vec![]); },
    };
    if !glob.sessions.is_authenticated() {
        return redirect(&Route::Login);
    }

    let notice = Notice::info(
        "Enrolled Successfully",
        format!("You have enrolled in {}", &title)
    );
    serve_course(&mut glob, &id, vec![notice])
}

pub async fn login_page(
    Extension(glob): Extension<SharedGlob>
) -> Response {
    log::trace!("login_page() called.");

    let mut glob = glob.write().await;
    serve_page(&mut glob, StatusCode::OK, "login", vec![], |_| {
        FormData::new("", "", Role::Student.as_str())
    })
}

pub async fn login(
    Extension(glob): Extension<SharedGlob>,
    Form(form): Form<LoginData>
) -> Response {
    log::trace!("login( {:?}, [ password ], {:?} ) called.", &form.email, &form.role);

    let role: Role = match form.role.parse() {
        Ok(role) => role,
        Err(e) => { return respond_bad_request(e); },
    };

    let mut glob = glob.write().await;
    let res = glob.sessions.login(&form.email, &form.password, role).await;
    match res {
        Ok(ident) => redirect(&Route::landing_for(ident.role)),
        Err(e) => serve_page(&mut glob, auth_error_status(&e), "login", vec![], |_| {
            FormData::new("", &form.email, role.as_str())
        }),
    }
}

pub async fn register_page(
    Extension(glob): Extension<SharedGlob>
) -> Response {
    log::trace!("register_page() called.");

    let mut glob = glob.write().await;
    serve_page(&mut glob, StatusCode::OK, "register", vec![], |_| {
        FormData::new("", "", Role::Student.as_str())
    })
}

pub async fn register(
    Extension(glob): Extension<SharedGlob>,
    Form(form): Form<RegisterData>
) -> Response {
    log::trace!(
        "register( {:?}, {:?}, [ passwords ], {:?} ) called.",
        &form.name, &form.email, &form.role
    );

    let role: Role = match form.role.parse() {
        Ok(role) => role,
        Err(e) => { return respond_bad_request(e); },
    };

    let mut glob = glob.write().await;

    if form.password != form.confirm_password {
        return serve_page(&mut glob, StatusCode::BAD_REQUEST, "register", vec![], |_| {
            let mut data = FormData::new(&form.name, &form.email, role.as_str());
            data.password_error = Some("Passwords don't match".to_owned());
            data
        });
    }

    let res = glob.sessions.register(&form.name, &form.email, &form.password, role).await;
    match res {
        Ok(ident) => redirect(&Route::landing_for(ident.role)),
        Err(e) => serve_page(&mut glob, auth_error_status(&e), "register", vec![], |_| {
            FormData::new(&form.name, &form.email, role.as_str())
        }),
    }
}

pub async fn logout(
    Extension(glob): Extension<SharedGlob>
) -> Response {
    log::trace!("logout() called.");

    glob.write().await.sessions.logout().await;
    redirect(&Route::Login)
}

/// Every role's dashboard, each guarded so only that role gets in.
pub async fn dashboard(
    UrlPath(role): UrlPath<String>,
    Extension(glob): Extension<SharedGlob>
) -> Response {
    log::trace!("dashboard( {:?} ) called.", &role);

    let role: Role = match role.parse() {
        Ok(role) => role,
        Err(e) => {
            log::debug!("{}", &e);
            return redirect(&Route::Landing);
        },
    };

    let mut glob = glob.write().await;
    if let Outcome::Redirect(r) = guard::check(glob.sessions.session(), &[role]) {
        return redirect(&r);
    }
    let ident = match glob.sessions.identity() {
        Some(ident) => ident.clone(),
        None => { return redirect(&Route::Login); },
    };

    match role {
        Role::Student => serve_page(&mut glob, StatusCode::OK, "student", vec![], |g| {
            student::dashboard_data(&g.catalog, &ident)
        }),
        Role::Teacher => serve_page(&mut glob, StatusCode::OK, "teacher", vec![], |g| {
            teacher::dashboard_data(&g.catalog, &ident)
        }),
        Role::Admin => serve_page(&mut glob, StatusCode::OK, "admin", vec![], |g| {
            admin::dashboard_data(&g.catalog, g.sessions.directory(), &ident)
        }),
    }
}

pub fn router<P: AsRef<Path>>(glob: SharedGlob, static_dir: P) -> Router {
    Router::new()
        .route("/", get(landing))
        .route("/courses", get(courses))
        .route("/course/:id", get(course_detail))
        .route("/course/:id/enroll", post(enroll))
        .route("/login", get(login_page).post(login))
        .route("/register", get(register_page).post(register))
        .route("/logout", post(logout))
        .route("/:role/dashboard", get(dashboard))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .layer(Extension(glob))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Cfg;
    use crate::tests::ensure_logging;
    use crate::user::mock_identities;

    use axum::http::header;
    use serial_test::serial;

    static TEST_DIR: &str = "test/storage_inter";

    fn test_glob() -> SharedGlob {
        let _ = std::fs::remove_dir_all(TEST_DIR);
        let cfg = Cfg {
            storage_dir: TEST_DIR.into(),
            ..Default::default()
        };
        Arc::new(RwLock::new(Glob::from_cfg(cfg).unwrap()))
    }

    fn location(resp: &Response) -> &str {
        resp.headers()[header::LOCATION].to_str().unwrap()
    }

    fn login_form(email: &str, role: &str) -> Form<LoginData> {
        Form(LoginData {
            email: email.to_owned(),
            password: "x".to_owned(),
            role: role.to_owned(),
        })
    }

    fn register_form(name: &str, email: &str, confirm: &str, role: &str) -> Form<RegisterData> {
        Form(RegisterData {
            name: name.to_owned(),
            email: email.to_owned(),
            password: "p".to_owned(),
            confirm_password: confirm.to_owned(),
            role: role.to_owned(),
        })
    }

    #[test]
    fn course_query_to_filter() {
        let q = CourseQuery {
            q: Some("  ".to_owned()),
            category: Some("".to_owned()),
            level: Some("Expert".to_owned()),
        };
        let f = q.to_filter();
        assert_eq!(f.query, "");
        assert_eq!(f.category, None);
        assert_eq!(f.level, None);

        let catalog = Catalog::mock();
        let q = CourseQuery {
            q: Some("python".to_owned()),
            category: None,
            level: Some("Beginner".to_owned()),
        };
        let data = courses_data(&catalog, &q);
        assert_eq!(data.courses.len(), 1);
        assert_eq!(data.courses[0].id, "course-2");
        assert_eq!(data.level, Some(Level::Beginner));
        assert_eq!(data.categories.len(), 4);
    }

    #[test]
    fn course_page_data() {
        let catalog = Catalog::mock();
        let data = course_data(&catalog, "course-1").unwrap();
        assert_eq!(data.assignments.len(), 2);
        assert_eq!(data.total_points, 250);
        assert!(course_data(&catalog, "course-0").is_none());
    }

    #[tokio::test]
    #[serial]
    async fn public_pages() {
        ensure_logging();
        let glob = test_glob();

        let resp = landing(Extension(glob.clone())).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let q = CourseQuery { q: Some("design".to_owned()), ..Default::default() };
        let resp = courses(Query(q), Extension(glob.clone())).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = course_detail(UrlPath("course-2".to_owned()), Extension(glob.clone())).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = course_detail(UrlPath("course-9".to_owned()), Extension(glob.clone())).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        assert_eq!(login_page(Extension(glob.clone())).await.status(), StatusCode::OK);
        assert_eq!(register_page(Extension(glob.clone())).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    #[serial]
    async fn dashboards_are_guarded() {
        ensure_logging();
        let glob = test_glob();

        let resp = dashboard(UrlPath("student".to_owned()), Extension(glob.clone())).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/login");

        let resp = dashboard(UrlPath("wizard".to_owned()), Extension(glob.clone())).await;
        assert_eq!(location(&resp), "/");

        let resp = login(Extension(glob.clone()), login_form("STUDENT@example.com", "student")).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/student/dashboard");

        for other in ["teacher", "admin"] {
            let resp = dashboard(UrlPath(other.to_owned()), Extension(glob.clone())).await;
            assert_eq!(location(&resp), "/student/dashboard");
        }

        let resp = dashboard(UrlPath("student".to_owned()), Extension(glob.clone())).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = logout(Extension(glob.clone())).await;
        assert_eq!(location(&resp), "/login");
        let resp = dashboard(UrlPath("student".to_owned()), Extension(glob.clone())).await;
        assert_eq!(location(&resp), "/login");

        for role in ["teacher", "admin"] {
            let email = format!("{}@example.com", role);
            login(Extension(glob.clone()), login_form(&email, role)).await;
            let resp = dashboard(UrlPath(role.to_owned()), Extension(glob.clone())).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let _ = std::fs::remove_dir_all(TEST_DIR);
    }

    #[tokio::test]
    #[serial]
    async fn login_failures() {
        ensure_logging();
        let glob = test_glob();

        let resp = login(Extension(glob.clone()), login_form("student@example.com", "boss")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = login(Extension(glob.clone()), login_form("student@example.com", "teacher")).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = login(Extension(glob.clone()), login_form("", "student")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        assert!(!glob.read().await.sessions.is_authenticated());
    }

    #[tokio::test]
    #[serial]
    async fn registration() {
        ensure_logging();
        let glob = test_glob();

        let resp = register(
            Extension(glob.clone()),
            register_form("Ada", "ada@x.com", "q", "teacher")
        ).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(!glob.read().await.sessions.directory().contains_email("ada@x.com"));

        let resp = register(
            Extension(glob.clone()),
            register_form("Ada", "ada@x.com", "p", "teacher")
        ).await;
        assert_eq!(location(&resp), "/teacher/dashboard");

        let resp = dashboard(UrlPath("teacher".to_owned()), Extension(glob.clone())).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = register(
            Extension(glob.clone()),
            register_form("Other Ada", "ADA@x.com", "p", "student")
        ).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let _ = std::fs::remove_dir_all(TEST_DIR);
    }

    #[tokio::test]
    #[serial]
    async fn enrolling() {
        ensure_logging();
        let glob = test_glob();

        let resp = enroll(UrlPath("course-1".to_owned()), Extension(glob.clone())).await;
        assert_eq!(location(&resp), "/login");

        let resp = enroll(UrlPath("course-77".to_owned()), Extension(glob.clone())).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        login(Extension(glob.clone()), login_form("student@example.com", "student")).await;
        let resp = enroll(UrlPath("course-1".to_owned()), Extension(glob.clone())).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(glob.write().await.take_notices().is_empty());

        let _ = std::fs::remove_dir_all(TEST_DIR);
    }

    #[test]
    #[serial]
    fn pages_render() {
        ensure_logging();
        let glob = test_glob();
        let glob = glob.try_read().unwrap();
        let ident = &mock_identities()[0];

        let page = Page {
            identity: Some(ident),
            notices: vec![Notice::info("Hello", "There".to_owned())],
            data: course_data(&glob.catalog, "course-1"),
        };
        let html = glob.templates.render("course", &page).unwrap();
        assert!(html.contains("Build a Personal Portfolio"));
        assert!(html.contains("2023-12-22"));
        assert!(html.contains("John Student"));
        assert!(html.contains("There"));

        let page = Page {
            identity: None,
            notices: vec![],
            data: course_data(&glob.catalog, "course-0"),
        };
        let html = glob.templates.render("course", &page).unwrap();
        assert!(html.contains("Course Not Found"));
        assert!(html.contains("/login"));

        let q = CourseQuery { q: Some("python".to_owned()), ..Default::default() };
        let page = Page { identity: None, notices: vec![], data: courses_data(&glob.catalog, &q) };
        let html = glob.templates.render("courses", &page).unwrap();
        assert!(html.contains("Python Programming"));
        assert!(!html.contains("UX/UI Design Principles"));

        let page = Page {
            identity: Some(ident),
            notices: vec![],
            data: student::dashboard_data(&glob.catalog, ident),
        };
        let html = glob.templates.render("student", &page).unwrap();
        assert!(html.contains("Welcome, John Student"));
    }

    #[tokio::test]
    #[serial]
    async fn router_builds() {
        let glob = test_glob();
        let _app = router(glob, "static");
    }
}

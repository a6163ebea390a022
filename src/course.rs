/*!
Course and Assignment records, plus the hard-coded mock data set.
*/
use serde::{Serialize, Serializer};
use time::{Date, macros::date};

use crate::DATE_FMT;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Advanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner     => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced     => "Advanced",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Beginner"     => Ok(Level::Beginner),
            "Intermediate" => Ok(Level::Intermediate),
            "Advanced"     => Ok(Level::Advanced),
            _ => Err(format!("{:?} is not a valid Level.", s)),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Display name of the instructor.
    pub instructor: String,
    /// `Identity` id of the instructor.
    pub instructor_id: String,
    pub category: String,
    pub level: Level,
    /// Free text, like "8 weeks".
    pub duration: String,
    pub enrolled_students: u32,
    pub rating: f32,
    pub image: String,
    pub price: Option<f32>,
    pub featured: bool,
}

fn serialize_date<S: Serializer>(d: &Date, s: S) -> Result<S::Ok, S::Error> {
    let text = d.format(DATE_FMT).map_err(serde::ser::Error::custom)?;
    s.serialize_str(&text)
}

#[derive(Clone, Debug, Serialize)]
pub struct Assignment {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: String,
    #[serde(serialize_with = "serialize_date")]
    pub due: Date,
    pub points: u32,
}

// Keeps the mock course table below readable.
#[allow(clippy::too_many_arguments)]
fn course(
    id: &str,
    title: &str,
    description: &str,
    instructor: &str,
    instructor_id: &str,
    category: &str,
    level: Level,
    duration: &str,
    enrolled_students: u32,
    rating: f32,
    image: &str,
    featured: bool,
) -> Course {
    Course {
        id: id.to_owned(),
        title: title.to_owned(),
        description: description.to_owned(),
        instructor: instructor.to_owned(),
        instructor_id: instructor_id.to_owned(),
        category: category.to_owned(),
        level,
        duration: duration.to_owned(),
        enrolled_students,
        rating,
        image: image.to_owned(),
        price: None,
        featured,
    }
}

pub fn mock_courses() -> Vec<Course> {
    vec![
        course(
            "course-1",
            "Introduction to Web Development",
            "Learn the fundamentals of web development including HTML, CSS, and JavaScript. Build your first website and understand key concepts of modern web development.",
            "Jane Teacher", "2",
            "Web Development", Level::Beginner, "8 weeks", 246, 4.8,
            "https://images.unsplash.com/photo-1461749280684-dccba630e2f6?auto=format&fit=crop&w=600&h=400&q=80",
            true,
        ),
        course(
            "course-2",
            "Python Programming: From Zero to Hero",
            "A comprehensive guide to Python programming language. Master Python syntax, data structures, and build real-world applications.",
            "Michael Python", "4",
            "Programming", Level::Beginner, "10 weeks", 352, 4.7,
            "https://images.unsplash.com/photo-1498050108023-c5249f4df085?auto=format&fit=crop&w=600&h=400&q=80",
            false,
        ),
        course(
            "course-3",
            "Advanced JavaScript Frameworks",
            "Deep dive into modern JavaScript frameworks like React, Vue, and Angular. Build complex single-page applications with industry best practices.",
            "Jane Teacher", "2",
            "Web Development", Level::Advanced, "12 weeks", 189, 4.9,
            "https://images.unsplash.com/photo-1486312338219-ce68d2c6f44d?auto=format&fit=crop&w=600&h=400&q=80",
            true,
        ),
        course(
            "course-4",
            "Data Science Fundamentals",
            "Introduction to data science concepts, tools, and methodologies. Learn data analysis, visualization, and basic machine learning techniques.",
            "Data Doctor", "5",
            "Data Science", Level::Intermediate, "8 weeks", 275, 4.6,
            "https://images.unsplash.com/photo-1460925895917-afdab827c52f?auto=format&fit=crop&w=600&h=400&q=80",
            false,
        ),
        course(
            "course-5",
            "UX/UI Design Principles",
            "Learn the fundamental principles of user experience and user interface design. Create beautiful, functional, and user-friendly digital products.",
            "Design Master", "6",
            "Design", Level::Beginner, "6 weeks", 210, 4.7,
            "https://images.unsplash.com/photo-1721322800607-8c38375eef04?auto=format&fit=crop&w=600&h=400&q=80",
            true,
        ),
    ]
}

fn assignment(
    id: &str,
    course_id: &str,
    title: &str,
    description: &str,
    due: Date,
    points: u32,
) -> Assignment {
    Assignment {
        id: id.to_owned(),
        course_id: course_id.to_owned(),
        title: title.to_owned(),
        description: description.to_owned(),
        due,
        points,
    }
}

pub fn mock_assignments() -> Vec<Assignment> {
    vec![
        assignment(
            "assignment-1", "course-1",
            "Build a Personal Portfolio",
            "Create a personal portfolio website using HTML, CSS, and basic JavaScript.",
            date!(2023-12-15), 100,
        ),
        assignment(
            "assignment-2", "course-1",
            "Responsive Design Project",
            "Build a fully responsive website that works well on all device sizes.",
            date!(2023-12-22), 150,
        ),
        assignment(
            "assignment-3", "course-2",
            "Python Data Analysis",
            "Analyze a dataset using Python and create visualizations using matplotlib and pandas.",
            date!(2023-12-18), 120,
        ),
    ]
}

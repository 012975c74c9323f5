//! The fixed program and course catalog, plus registration option lists.

use serde::{Deserialize, Serialize};

use crate::model::ProgramType;

/// A course offered under a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Stable key stored on the student row.
    pub id: String,
    pub title: String,
    pub description: String,
    pub details: String,
    #[serde(default = "default_true")]
    pub available: bool,
}

fn default_true() -> bool {
    true
}

/// A program type with its display text and courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub kind: ProgramType,
    pub title: String,
    pub summary: String,
    pub available: bool,
    pub courses: Vec<Course>,
}

impl Program {
    pub fn available_courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.iter().filter(|c| c.available)
    }

    /// A course must be chosen when the program is open and has one to choose.
    pub fn requires_course(&self) -> bool {
        self.available && self.available_courses().next().is_some()
    }
}

/// Programs keyed by type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    programs: Vec<Program>,
}

impl Catalog {
    pub fn new(programs: Vec<Program>) -> Self {
        Self { programs }
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn program(&self, kind: ProgramType) -> Option<&Program> {
        self.programs.iter().find(|p| p.kind == kind)
    }

    pub fn is_available(&self, kind: ProgramType) -> bool {
        self.program(kind).is_some_and(|p| p.available)
    }

    /// Override program availability. Programs not listed become unavailable.
    pub fn with_available_programs(mut self, open: &[ProgramType]) -> Self {
        for program in &mut self.programs {
            program.available = open.contains(&program.kind);
        }
        self
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(vec![
            Program {
                kind: ProgramType::Cohort,
                title: "Cohort Program".into(),
                summary: "Live mentorship with a batch of peers, online or offline.".into(),
                available: true,
                courses: vec![course(
                    "Full Stack Web Development",
                    "AI Native Full Stack Developer",
                    "Master frontend and backend technologies with live mentorship.",
                    "online/offline",
                )],
            },
            Program {
                kind: ProgramType::OnDemand,
                title: "On-Demand Courses".into(),
                summary: "Self-paced courses you can start any time.".into(),
                available: false,
                courses: vec![
                    course(
                        "React Mastery",
                        "React Mastery",
                        "Deep dive into React.js ecosystem at your own pace.",
                        "Self-paced",
                    ),
                    course(
                        "Node.js Advanced",
                        "Node.js Advanced",
                        "Build scalable backend systems with Node.js.",
                        "Self-paced",
                    ),
                ],
            },
            Program {
                kind: ProgramType::Workshop,
                title: "Workshops".into(),
                summary: "Short, hands-on sessions on a single topic.".into(),
                available: true,
                courses: vec![
                    course(
                        "Ace the HR Interview",
                        "Ace the HR Interview",
                        "Learn tips and tricks to crack HR interviews confidently.",
                        "Live Workshop",
                    ),
                    course(
                        "Crochet",
                        "Crochet",
                        "Learn the art of crochet in this hands-on workshop.",
                        "Hands-on",
                    ),
                ],
            },
        ])
    }
}

fn course(id: &str, title: &str, description: &str, details: &str) -> Course {
    Course {
        id: id.into(),
        title: title.into(),
        description: description.into(),
        details: details.into(),
        available: true,
    }
}

/// Slots offered when the server list cannot be fetched.
pub const DEFAULT_TIME_SLOTS: [&str; 2] = ["19th January", "2nd February"];

pub const SESSION_TIMES: [&str; 2] = [
    "Morning Session (10am-11.30am)",
    "Evening Session (5pm-6.30pm)",
];

pub const YEARS_OF_PASSING: [&str; 5] = ["2024", "2025", "2026", "2027", "2028"];

pub const BRANCHES: [&str; 16] = [
    "Computer Science Engineering (CSE)",
    "Artificial Intelligence & Machine Learning (AIML)",
    "Data Science",
    "Information Technology (IT)",
    "Electronics and Communication Engineering (ECE)",
    "Electrical Engineering (EE)",
    "Mechanical Engineering",
    "Civil Engineering",
    "Chemical Engineering",
    "Biotechnology",
    "Aerospace Engineering",
    "Automobile Engineering",
    "Industrial Engineering",
    "Robotics Engineering",
    "Cyber Security",
    "Other",
];

use tracing::info;

use crate::models::{NewCourse, NewLesson};
use crate::{Database, Result};

struct DemoCourse {
    title: &'static str,
    description: &'static str,
    category: &'static str,
    html_file: &'static str,
    lessons: &'static [(&'static str, &'static str)],
}

const DEMO_CATALOG: &[DemoCourse] = &[
    DemoCourse {
        title: "Photography Basics",
        description: "Exposure, composition and light for first-time shooters.",
        category: "Photography",
        html_file: "courses/photography-basics.html",
        lessons: &[
            ("Understanding exposure", "https://videos.example.com/exposure"),
            ("The rule of thirds", "https://videos.example.com/thirds"),
            ("Working with natural light", "https://videos.example.com/light"),
        ],
    },
    DemoCourse {
        title: "Darkroom Developing",
        description: "Develop and print black-and-white film at home.",
        category: "Film",
        html_file: "courses/darkroom-developing.html",
        lessons: &[
            ("Setting up a darkroom", "https://videos.example.com/darkroom"),
            ("Developing your first roll", "https://videos.example.com/develop"),
        ],
    },
];

impl Database {
    /// Insert the demo catalogue, but only into an empty courses table.
    /// Returns the number of courses created.
    pub fn seed_demo_catalog(&self) -> Result<usize> {
        if self.entity_counts()?.courses > 0 {
            info!("Courses already present, skipping demo seed");
            return Ok(0);
        }

        for demo in DEMO_CATALOG {
            let course = NewCourse {
                title: demo.title.to_string(),
                description: demo.description.to_string(),
                category: Some(demo.category.to_string()),
                html_file: Some(demo.html_file.to_string()),
            };
            let lessons: Vec<NewLesson> = demo
                .lessons
                .iter()
                .zip(0..)
                .map(|(&(title, video), position)| NewLesson {
                    title: title.to_string(),
                    video_url: Some(video.to_string()),
                    position,
                })
                .collect();

            let id = self.create_course_with_lessons(&course, &lessons)?;
            info!("Seeded course {} ({} lessons)", id, lessons.len());
        }

        Ok(DEMO_CATALOG.len())
    }
}

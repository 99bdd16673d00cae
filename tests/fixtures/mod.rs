//! Job rows for tests

#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

/// Builder for a `jobs` row. Defaults to an active, non-featured,
/// full-time mid-level Technology posting.
#[derive(Debug, Clone)]
pub struct JobRow {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: &'static str,
    pub category: String,
    pub experience_level: &'static str,
    pub description: String,
    pub featured: bool,
    pub status: &'static str,
    /// Minutes after the fixture epoch; larger is newer.
    pub age_rank: i64,
}

impl JobRow {
    pub fn new(title: &str, company: &str, location: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            employer_id: Uuid::new_v4(),
            title: title.to_string(),
            company: company.to_string(),
            location: location.to_string(),
            job_type: "full-time",
            category: "Technology".to_string(),
            experience_level: "mid",
            description: format!("{} at {}", title, company),
            featured: false,
            status: "active",
            age_rank: 0,
        }
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    pub fn status(mut self, status: &'static str) -> Self {
        self.status = status;
        self
    }

    pub fn job_type(mut self, job_type: &'static str) -> Self {
        self.job_type = job_type;
        self
    }

    pub fn experience(mut self, level: &'static str) -> Self {
        self.experience_level = level;
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn employer(mut self, employer_id: Uuid) -> Self {
        self.employer_id = employer_id;
        self
    }

    pub fn posted(mut self, age_rank: i64) -> Self {
        self.age_rank = age_rank;
        self
    }

    pub fn to_value(&self) -> Value {
        let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let created = (epoch + Duration::minutes(self.age_rank))
            .format("%Y-%m-%dT%H:%M:%S+00:00")
            .to_string();
        json!({
            "id": self.id,
            "employer_id": self.employer_id,
            "title": self.title,
            "company": self.company,
            "location": self.location,
            "type": self.job_type,
            "category": self.category,
            "experience_level": self.experience_level,
            "salary_min": 80000,
            "salary_max": 110000,
            "currency": "$",
            "description": self.description,
            "requirements": "Experience shipping software",
            "benefits": null,
            "featured": self.featured,
            "status": self.status,
            "applications_count": 0,
            "created_at": created,
            "updated_at": created
        })
    }
}

/// A small, varied board.
pub fn sample_board() -> Vec<JobRow> {
    vec![
        JobRow::new("Senior Rust Engineer", "Ferrous Systems", "Berlin, Germany")
            .experience("senior")
            .featured()
            .posted(10),
        JobRow::new("Product Designer", "Pixel Co", "Remote")
            .category("Design")
            .job_type("remote")
            .posted(20),
        JobRow::new("Data Analyst", "Engineering Analytics Ltd", "London, UK")
            .category("Finance")
            .job_type("contract")
            .posted(30),
        JobRow::new("Sales Lead", "Acme", "New York, USA")
            .category("Sales")
            .description("Work closely with our engineer team")
            .experience("executive")
            .posted(40),
        JobRow::new("Frontend Engineer", "Acme", "Berlin, Germany")
            .job_type("part-time")
            .experience("entry")
            .posted(50),
        JobRow::new("Platform Engineer", "Closed Corp", "Berlin, Germany")
            .status("closed")
            .posted(60),
        JobRow::new("Draft Engineer", "Draft Corp", "Remote")
            .status("draft")
            .featured()
            .posted(70),
    ]
}

/// `n` active, non-featured jobs with distinct posting times.
pub fn bulk_board(n: usize) -> Vec<JobRow> {
    (0..n)
        .map(|i| JobRow::new(&format!("Job {}", i), "Bulk Inc", "Anywhere").posted(i as i64))
        .collect()
}

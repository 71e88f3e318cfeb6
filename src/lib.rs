pub mod core {
    pub mod config;
    pub mod error;
    pub mod routes;
    pub mod startup;
    pub mod state;
    pub mod tracing_init;
}

pub mod auth {
    pub mod extract;
    pub mod guard;
    pub mod token;
}

pub mod handlers {
    pub mod auth;
    pub mod categories;
    pub mod comments;
    pub mod fallback;
    pub mod genres;
    pub mod health;
    pub mod metrics;
    pub mod reviews;
    pub mod titles;
    pub mod users;
}

pub mod models {
    pub mod catalog;
    pub mod comment;
    pub mod page;
    pub mod review;
    pub mod title;
    pub mod user;
}

pub mod stores {
    pub mod catalog_store;
    pub mod review_store;
    pub mod user_store;
}

pub mod metrics {
    pub mod collector;
}

pub mod notify {
    pub mod mailer;
}

pub mod validation {
    pub mod fields;
}

pub mod utils {
    pub mod auth;
    pub mod time;
}

pub mod wal {
    pub mod wal;
}

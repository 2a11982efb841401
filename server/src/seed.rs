//! Demo data loader.
//!
//! SYSTEM CONTEXT
//! ==============
//! Run once against a fresh database (`cargo run --bin seed`) to get a
//! usable demo: a handful of members and visitors plus one login per role,
//! all with the password [`DEMO_PASSWORD`].
//!
//! DESIGN
//! ======
//! Everything happens in one transaction; a failure leaves the database
//! untouched. Rows are keyed by natural keys (member/visitor email, username)
//! and existing rows are skipped, so re-running inserts nothing new.

use std::collections::HashMap;

use accounts::Role;
use sqlx::{PgConnection, PgPool, Row};
use tracing::{debug, info};

use crate::services::password::{PasswordError, hash_password};

pub const DEMO_PASSWORD: &str = "senha123";

pub struct DemoMember {
    pub full_name: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub birth_date: &'static str,
    pub address: &'static str,
}

pub struct DemoVisitor {
    pub full_name: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub first_visit_at: &'static str,
}

/// Personal record a demo login is attached to, by email.
#[derive(Clone, Copy)]
pub enum Link {
    Member(&'static str),
    Visitor(&'static str),
}

pub struct DemoUser {
    pub username: &'static str,
    pub role: Role,
    pub link: Link,
}

pub const DEMO_MEMBERS: &[DemoMember] = &[
    DemoMember {
        full_name: "João Batista Silva",
        email: "joao.silva@example.org",
        phone: "(11) 98765-4321",
        birth_date: "1968-03-14",
        address: "Rua das Flores, 120 - São Paulo/SP",
    },
    DemoMember {
        full_name: "Maria Aparecida Oliveira",
        email: "maria.oliveira@example.org",
        phone: "(11) 97654-3210",
        birth_date: "1975-07-22",
        address: "Av. Brasil, 455 - São Paulo/SP",
    },
    DemoMember {
        full_name: "Pedro Henrique Santos",
        email: "pedro.santos@example.org",
        phone: "(11) 96543-2109",
        birth_date: "1982-11-03",
        address: "Rua São Bento, 78 - São Paulo/SP",
    },
    DemoMember {
        full_name: "Ana Beatriz Costa",
        email: "ana.costa@example.org",
        phone: "(11) 95432-1098",
        birth_date: "1990-01-30",
        address: "Rua Augusta, 1500 - São Paulo/SP",
    },
    DemoMember {
        full_name: "Lucas Gabriel Pereira",
        email: "lucas.pereira@example.org",
        phone: "(11) 94321-0987",
        birth_date: "2001-05-17",
        address: "Rua Vergueiro, 890 - São Paulo/SP",
    },
];

pub const DEMO_VISITORS: &[DemoVisitor] = &[
    DemoVisitor {
        full_name: "Carla Mendes",
        email: "carla.mendes@example.org",
        phone: "(11) 93210-9876",
        first_visit_at: "2024-02-04",
    },
    DemoVisitor {
        full_name: "Rafael Souza",
        email: "rafael.souza@example.org",
        phone: "(11) 92109-8765",
        first_visit_at: "2024-03-10",
    },
];

pub const DEMO_USERS: &[DemoUser] = &[
    DemoUser { username: "pastor", role: Role::Pastor, link: Link::Member("joao.silva@example.org") },
    DemoUser { username: "tesoureiro", role: Role::Treasurer, link: Link::Member("maria.oliveira@example.org") },
    DemoUser { username: "diacono", role: Role::Deacon, link: Link::Member("pedro.santos@example.org") },
    DemoUser { username: "membro", role: Role::Member, link: Link::Member("ana.costa@example.org") },
    DemoUser { username: "visitante", role: Role::Visitor, link: Link::Visitor("carla.mendes@example.org") },
];

/// Rows inserted by one run. Skipped rows are not counted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub members: u64,
    pub visitors: u64,
    pub users: u64,
}

impl SeedReport {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.members + self.visitors + self.users
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("demo user {username} links to unknown record {email}")]
    MissingLink { username: &'static str, email: &'static str },
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Insert the demo data set.
///
/// # Errors
///
/// Any failure rolls the whole run back and is returned as [`SeedError`].
pub async fn run(pool: &PgPool) -> Result<SeedReport, SeedError> {
    let mut tx = pool.begin().await?;
    let mut report = SeedReport::default();

    let mut member_ids = HashMap::new();
    for member in DEMO_MEMBERS {
        let (id, inserted) = upsert_member(&mut tx, member).await?;
        report.members += u64::from(inserted);
        member_ids.insert(member.email, id);
    }

    let mut visitor_ids = HashMap::new();
    for visitor in DEMO_VISITORS {
        let (id, inserted) = upsert_visitor(&mut tx, visitor).await?;
        report.visitors += u64::from(inserted);
        visitor_ids.insert(visitor.email, id);
    }

    for user in DEMO_USERS {
        let missing = |email| SeedError::MissingLink { username: user.username, email };
        let (member_id, visitor_id) = match user.link {
            Link::Member(email) => (Some(*member_ids.get(email).ok_or_else(|| missing(email))?), None),
            Link::Visitor(email) => (None, Some(*visitor_ids.get(email).ok_or_else(|| missing(email))?)),
        };
        let inserted = insert_user(&mut tx, user, member_id, visitor_id).await?;
        report.users += u64::from(inserted);
    }

    tx.commit().await?;
    info!(members = report.members, visitors = report.visitors, users = report.users, "seed committed");
    Ok(report)
}

async fn upsert_member(conn: &mut PgConnection, member: &DemoMember) -> Result<(i64, bool), sqlx::Error> {
    let inserted = sqlx::query(
        "INSERT INTO members (full_name, email, phone, birth_date, address, lgpd_consent_at)
         VALUES ($1, $2, $3, $4::date, $5, now())
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(member.full_name)
    .bind(member.email)
    .bind(member.phone)
    .bind(member.birth_date)
    .bind(member.address)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some(row) = inserted {
        return Ok((row.get("id"), true));
    }

    debug!(email = member.email, "member already present");
    let row = sqlx::query("SELECT id FROM members WHERE email = $1")
        .bind(member.email)
        .fetch_one(&mut *conn)
        .await?;
    Ok((row.get("id"), false))
}

async fn upsert_visitor(conn: &mut PgConnection, visitor: &DemoVisitor) -> Result<(i64, bool), sqlx::Error> {
    let inserted = sqlx::query(
        "INSERT INTO visitors (full_name, email, phone, first_visit_at, lgpd_consent_at)
         VALUES ($1, $2, $3, $4::date, now())
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(visitor.full_name)
    .bind(visitor.email)
    .bind(visitor.phone)
    .bind(visitor.first_visit_at)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some(row) = inserted {
        return Ok((row.get("id"), true));
    }

    debug!(email = visitor.email, "visitor already present");
    let row = sqlx::query("SELECT id FROM visitors WHERE email = $1")
        .bind(visitor.email)
        .fetch_one(&mut *conn)
        .await?;
    Ok((row.get("id"), false))
}

/// Insert a login unless the username is taken. Existing users keep their
/// password and links.
async fn insert_user(
    conn: &mut PgConnection,
    user: &DemoUser,
    member_id: Option<i64>,
    visitor_id: Option<i64>,
) -> Result<bool, SeedError> {
    let exists: bool = sqlx::query("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1) AS present")
        .bind(user.username)
        .fetch_one(&mut *conn)
        .await?
        .get("present");
    if exists {
        debug!(username = user.username, "user already present");
        return Ok(false);
    }

    let hash = hash_password(DEMO_PASSWORD)?;
    let inserted = sqlx::query(
        "INSERT INTO users (username, password_hash, role, member_id, visitor_id)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (username) DO NOTHING",
    )
    .bind(user.username)
    .bind(hash)
    .bind(user.role.as_str())
    .bind(member_id)
    .bind(visitor_id)
    .execute(&mut *conn)
    .await?;
    Ok(inserted.rows_affected() > 0)
}

#[cfg(test)]
#[path = "seed_test.rs"]
mod tests;

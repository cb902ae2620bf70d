use anyhow::Context;
use tracing::{info, warn};

use super::models::{HobbyLevel, NewHobby, NewUser, ADMIN_ROLE, USER_ROLE};
use super::Store;
use crate::auth::password::hash_password;

struct DemoUser {
    username: &'static str,
    full_name: &'static str,
    email: &'static str,
    password: &'static str,
    admin: bool,
    hobbies: &'static [(&'static str, HobbyLevel)],
}

const DEMO_USERS: &[DemoUser] = &[
    DemoUser {
        username: "admin",
        full_name: "System Administrator",
        email: "admin@hobbyhub.local",
        password: "Admin123!",
        admin: true,
        hobbies: &[("Reading", HobbyLevel::Expert), ("Coding", HobbyLevel::Intermediate)],
    },
    DemoUser {
        username: "joko_santoso",
        full_name: "Joko Santoso",
        email: "joko.santoso@example.com",
        password: "Password123!",
        admin: false,
        hobbies: &[("Photography", HobbyLevel::Beginner), ("Hiking", HobbyLevel::Intermediate)],
    },
    DemoUser {
        username: "asep_wijaya",
        full_name: "Asep Wijaya",
        email: "asep.wijaya@example.com",
        password: "Password123!",
        admin: false,
        hobbies: &[("Painting", HobbyLevel::Expert), ("Cooking", HobbyLevel::Beginner)],
    },
];

/// Creates the demo accounts when the users table is empty. The admin account
/// holds both roles; the admin assigns the "User" role to everyone else.
pub async fn seed_demo_users(store: &dyn Store) -> anyhow::Result<()> {
    let existing = store.count_users().await.context("count users")?;
    if existing > 0 {
        info!(existing, "users already present; skipping seeding");
        return Ok(());
    }

    let admin_role = store.find_role_by_name(ADMIN_ROLE).await.context("load Admin role")?;
    let user_role = store.find_role_by_name(USER_ROLE).await.context("load User role")?;
    let (Some(admin_role), Some(user_role)) = (admin_role, user_role) else {
        warn!("seed roles missing; skipping seeding");
        return Ok(());
    };

    let mut admin_id = None;
    for demo in DEMO_USERS {
        let role_ids = if demo.admin {
            vec![admin_role.id, user_role.id]
        } else {
            vec![user_role.id]
        };
        let user = store
            .create_user(NewUser {
                username: demo.username.to_string(),
                full_name: demo.full_name.to_string(),
                email: demo.email.to_string(),
                password_hash: hash_password(demo.password).await?,
                hobbies: demo
                    .hobbies
                    .iter()
                    .map(|(name, level)| NewHobby {
                        name: name.to_string(),
                        level: *level,
                    })
                    .collect(),
                role_ids,
                assigned_by: admin_id,
            })
            .await
            .with_context(|| format!("seed user {}", demo.username))?;
        if demo.admin {
            admin_id = Some(user.id);
        }
        info!(user_id = user.id, username = %user.username, "seeded demo user");
    }

    Ok(())
}

//! Development user set preloaded at startup when seeding is enabled.

use crate::models::{CreateUser, Name, Role};

const ADMIN_PASSWORD: &str = "pA22er.54321";
const DEFAULT_PASSWORD: &str = "Testing.12345";

const CONSUMER_AGENT: &[Role] = &[Role::Consumer, Role::Agent];

/// One admin, two merchants, two consumer/agents and three agents
pub fn development_users() -> Vec<CreateUser> {
    let accounts: [(&str, &str, &str, &[Role]); 8] = [
        ("admin@passer.com", "Admin", "PASSER", &[Role::Admin]),
        ("xy.lim@bestbuy.com", "X. Y.", "Lim", &[Role::Merchant]),
        ("azi.abdu@bismi.com", "Azi", "Abdu", &[Role::Merchant]),
        ("jimmy.dean@gmail.com", "Jimmy", "Dean", CONSUMER_AGENT),
        ("jolin.lim@gmail.com", "Jolin", "Lim", CONSUMER_AGENT),
        ("joe.jet@gmail.com", "Joe", "Jet", &[Role::Agent]),
        ("jacky.chuang@gmail.com", "Jacky", "Chuang", &[Role::Agent]),
        ("alex.tao@gmail.com", "Alex", "Tao", &[Role::Agent]),
    ];

    accounts
        .into_iter()
        .map(|(email, first, last, roles)| CreateUser {
            email: email.to_string(),
            name: Name::new(first, last),
            password: if roles.contains(&Role::Admin) {
                ADMIN_PASSWORD
            } else {
                DEFAULT_PASSWORD
            }
            .to_string(),
            is_active: true,
            roles: roles.to_vec(),
        })
        .collect()
}

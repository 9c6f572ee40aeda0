use super::CommandContext;
use anyhow::Result;
use securescope_core::{AccessControl, Grant};

pub async fn check(ctx: &CommandContext, email: &str, password: &str, permission: &str) -> Result<()> {
    ctx.system.login(email, password).await?;
    print_check(&ctx.system, permission);
    Ok(())
}

pub async fn whoami(ctx: &CommandContext, email: &str, password: &str) -> Result<()> {
    ctx.system.login(email, password).await?;
    print_whoami(&ctx.system);
    Ok(())
}

pub fn print_check(system: &AccessControl, permission: &str) {
    match system.explain_permission(permission) {
        Some(Grant::Role { role }) => println!("{}: granted by role {}", permission, role),
        Some(Grant::Group { group_id }) => println!("{}: granted by group {}", permission, group_id),
        None => println!("{}: denied", permission),
    }
}

pub fn print_whoami(system: &AccessControl) {
    let Some(user) = system.current_user() else {
        println!("Not logged in.");
        return;
    };

    println!("{} <{}>", user.name, user.email);
    println!("  ID: {}", user.id);
    println!("  Role: {}", user.role);
    if let Some(dashboard) = system.dashboard() {
        println!("  Dashboard: {:?}", dashboard);
    }

    let groups: Vec<String> = system.groups_for_user(&user.id).into_iter().map(|g| g.name).collect();
    println!("  Groups: {}", if groups.is_empty() { "-".to_string() } else { groups.join(", ") });

    let permissions: Vec<String> = system.effective_permissions().into_iter().collect();
    println!("  Permissions: {}", if permissions.is_empty() { "-".to_string() } else { permissions.join(", ") });
}

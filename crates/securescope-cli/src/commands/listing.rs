use super::CommandContext;
use anyhow::Result;
use securescope_core::{Group, Permission, PermissionCategory, User};

pub fn show_users(ctx: &CommandContext, json: bool) -> Result<()> {
    let users = ctx.system.list_users();

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    print_users(&users);
    Ok(())
}

pub fn show_groups(ctx: &CommandContext, json: bool) -> Result<()> {
    let groups = ctx.system.list_groups();

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    print_groups(&groups);
    Ok(())
}

pub fn show_permissions(ctx: &CommandContext, json: bool) -> Result<()> {
    let grouped = ctx.system.permissions_by_category();

    if json {
        println!("{}", serde_json::to_string_pretty(&grouped)?);
        return Ok(());
    }

    print_permissions(&grouped);
    Ok(())
}

pub fn print_users(users: &[User]) {
    if users.is_empty() {
        println!("No users registered.");
        return;
    }

    println!("{:<36} {:<24} {:<28} {:<10} {:<20}", "ID", "Name", "Email", "Role", "Groups");
    println!("{}", "-".repeat(122));

    for user in users {
        let groups: Vec<&str> = user.groups.iter().map(String::as_str).collect();
        println!("{:<36} {:<24} {:<28} {:<10} {:<20}", user.id, user.name, user.email, user.role, groups.join(","));
    }
}

pub fn print_groups(groups: &[Group]) {
    if groups.is_empty() {
        println!("No groups defined.");
        return;
    }

    for group in groups {
        println!("{} ({})", group.name, group.id);
        if !group.description.is_empty() {
            println!("  {}", group.description);
        }
        let permissions: Vec<&str> = group.permissions.iter().map(String::as_str).collect();
        let members: Vec<&str> = group.members.iter().map(String::as_str).collect();
        println!("  Permissions: {}", if permissions.is_empty() { "-".to_string() } else { permissions.join(", ") });
        println!("  Members: {}", if members.is_empty() { "-".to_string() } else { members.join(", ") });
    }
}

pub fn print_permissions(grouped: &[(PermissionCategory, Vec<Permission>)]) {
    if grouped.is_empty() {
        println!("Permission catalog is empty.");
        return;
    }

    for (category, permissions) in grouped {
        println!("{} permissions:", category);
        for permission in permissions {
            println!("  {:<20} {:<20} {}", permission.id, permission.name, permission.description);
        }
    }
}

use super::CommandContext;
use super::listing::{print_groups, print_permissions, print_users};
use super::session::{print_check, print_whoami};
use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use securescope_core::{AccessControl, AccessDecision, MembershipChange, NewGroup, NewUser, PermissionCategory, Role, View};
use std::io::{self, BufRead, Write};

#[derive(Parser, Debug)]
#[command(name = "shell", no_binary_name = true, disable_help_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Log in with email and password
    Login { email: String, password: String },
    /// End the current session
    Logout,
    /// Show the session user
    Whoami,
    /// Test a permission for the session user
    Can { permission: String },
    /// Guard check for a view: home, users, groups, analytics or settings
    Visit { view: View },
    /// List users
    Users,
    /// List groups
    Groups,
    /// List the permission catalog
    Permissions,
    /// Create a user
    CreateUser {
        name: String,
        email: String,
        #[arg(long, default_value = "user")]
        role: Role,
        #[arg(long, default_value = "password")]
        password: String,
    },
    /// Create a group
    CreateGroup {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long = "permission")]
        permissions: Vec<String>,
    },
    /// Add a user to a group
    AddMember { user_id: String, group_id: String },
    /// Remove a user from a group
    RemoveMember { user_id: String, group_id: String },
    /// Replace a group's permission set
    SetPermissions { group_id: String, permissions: Vec<String> },
    /// Grant or revoke one permission on a group
    TogglePermission { group_id: String, permission: String },
    /// Add a catalog permission
    AddPermission {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "content")]
        category: PermissionCategory,
    },
    /// Remove a catalog permission
    RemovePermission { id: String },
    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

enum Flow {
    Continue,
    Exit,
}

pub async fn run_shell(ctx: &CommandContext) -> Result<()> {
    println!("SecureScope shell. Type 'help' for commands, 'exit' to leave.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{}> ", prompt(&ctx.system));
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;

        let words = match split_words(&line) {
            Ok(words) => words,
            Err(e) => {
                println!("Error: {}", e);
                continue;
            }
        };
        if words.is_empty() {
            continue;
        }

        let parsed = match ShellLine::try_parse_from(&words) {
            Ok(parsed) => parsed,
            Err(e) => {
                println!("{}", e.render());
                continue;
            }
        };

        match execute(&ctx.system, parsed.command).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(e) => println!("Error: {}", e),
        }
    }

    Ok(())
}

fn prompt(system: &AccessControl) -> String {
    system.current_user().map(|u| u.email).unwrap_or_else(|| "anonymous".to_string())
}

async fn execute(system: &AccessControl, command: ShellCommand) -> Result<Flow> {
    match command {
        ShellCommand::Login { email, password } => {
            let user = system.login(&email, &password).await?;
            println!("Logged in as {} ({})", user.name, user.role);
        }
        ShellCommand::Logout => match system.logout() {
            Some(_) => println!("Logged out"),
            None => println!("No active session"),
        },
        ShellCommand::Whoami => print_whoami(system),
        ShellCommand::Can { permission } => print_check(system, &permission),
        ShellCommand::Visit { view } => match system.check_view(view) {
            AccessDecision::Granted => println!("Granted"),
            AccessDecision::LoginRequired => println!("Redirect to login"),
            AccessDecision::Forbidden => println!("Redirect to home"),
        },
        ShellCommand::Users => print_users(&system.list_users()),
        ShellCommand::Groups => print_groups(&system.list_groups()),
        ShellCommand::Permissions => print_permissions(&system.permissions_by_category()),
        ShellCommand::CreateUser { name, email, role, password } => {
            let user = system.create_user(NewUser::new(name, email, role, password))?;
            println!("Created user {} ({})", user.name, user.id);
        }
        ShellCommand::CreateGroup { name, description, permissions } => {
            let group = system.create_group(NewGroup::new(name, description).with_permissions(permissions));
            println!("Created group {} ({})", group.name, group.id);
        }
        ShellCommand::AddMember { user_id, group_id } => {
            report_membership(system.add_user_to_group(&user_id, &group_id), &user_id, &group_id)?;
        }
        ShellCommand::RemoveMember { user_id, group_id } => {
            report_membership(system.remove_user_from_group(&user_id, &group_id), &user_id, &group_id)?;
        }
        ShellCommand::SetPermissions { group_id, permissions } => {
            let Some(group) = system.update_group_permissions(&group_id, permissions.into_iter().collect()) else {
                bail!("unknown group {}", group_id);
            };
            println!("{} now grants {} permission(s)", group.name, group.permissions.len());
        }
        ShellCommand::TogglePermission { group_id, permission } => {
            let Some(group) = system.toggle_group_permission(&group_id, &permission) else {
                bail!("unknown group {}", group_id);
            };
            let state = if group.grants(&permission) { "granted" } else { "revoked" };
            println!("{} {} on {}", permission, state, group.name);
        }
        ShellCommand::AddPermission { name, description, category } => {
            let permission = system.add_permission(&name, &description, category)?;
            println!("Added permission {} ({})", permission.id, permission.category);
        }
        ShellCommand::RemovePermission { id } => match system.remove_permission(&id) {
            Some(permission) => println!("Removed permission {}", permission.id),
            None => println!("No permission {}", id),
        },
        ShellCommand::Exit => return Ok(Flow::Exit),
    }

    Ok(Flow::Continue)
}

fn report_membership(change: MembershipChange, user_id: &str, group_id: &str) -> Result<()> {
    match change {
        MembershipChange::Changed => println!("Membership updated"),
        MembershipChange::Unchanged => println!("Nothing to change"),
        MembershipChange::UnknownUser => bail!("unknown user {}", user_id),
        MembershipChange::UnknownGroup => bail!("unknown group {}", group_id),
    }
    Ok(())
}

/// Split a line into words, honoring single and double quotes
fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        bail!("unterminated quote");
    }
    if in_word {
        words.push(current);
    }

    Ok(words)
}

//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::api::ApiClient;
use crate::auth;
use crate::config::Config;
use crate::db::{init_database, Session, SessionStore};
use crate::errors::{CrmError, CrmResult};
use crate::leads::{SortDirection, StatusFilter};
use crate::models::{
    Appearance, AvatarUpload, LeadDraft, LeadSource, LeadStatus, SignUpForm, Theme, TrendPeriod,
    THEMES,
};
use crate::pages::{LeadsPage, NoticeKind, Notifier, SalesTeamPage};
use crate::settings;
use crate::teams::department_targets;

#[derive(Debug, Parser)]
#[command(name = "crm", version, about = "Client for the CRM REST API")]
pub struct Cli {
    /// Override CRM_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Override CRM_SESSION_PATH
    #[arg(long, global = true)]
    pub session_path: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Flags win over the environment.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(api_url) = &self.api_url {
            config.api_url = api_url.trim_end_matches('/').to_string();
        }
        if let Some(session_path) = &self.session_path {
            config.session_path = session_path.clone();
        }
        config.log_json |= self.log_json;
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session token
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Request a password reset link
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password with the token from the reset link
    ResetPassword {
        token: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Sign out and forget the stored session
    Signout,
    #[command(subcommand)]
    Leads(LeadsCommand),
    #[command(subcommand)]
    Teams(TeamsCommand),
    /// Show lead metrics
    Dashboard {
        #[arg(long, value_enum, default_value_t = PeriodArg::Monthly)]
        period: PeriodArg,
    },
    #[command(subcommand)]
    Profile(ProfileCommand),
    #[command(subcommand)]
    Theme(ThemeCommand),
}

#[derive(Debug, Subcommand)]
pub enum LeadsCommand {
    /// List leads, sorted by name
    List {
        #[arg(long, default_value = "")]
        search: String,
        /// A lead status, or "all" for every non-archived lead
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(long)]
        desc: bool,
    },
    /// Show one lead
    Show { id: String },
    Add(LeadFields),
    /// Change fields of an existing lead
    Update {
        id: String,
        #[command(flatten)]
        fields: LeadUpdateFields,
    },
    Delete { id: String },
    Archive { id: String },
    Restore { id: String },
    /// Mark a lead as converted
    Convert { id: String },
    /// Move a lead to any status
    SetStatus { id: String, status: LeadStatus },
    /// Restore an archived lead, archive any other
    ToggleArchive { id: String },
    /// Write every cached lead as JSON
    Export {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct LeadFields {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long, default_value = "Website")]
    pub source: String,
    #[arg(long, default_value = "New")]
    pub status: LeadStatus,
    #[arg(long)]
    pub assigned_to: Option<String>,
}

#[derive(Debug, Args)]
pub struct LeadUpdateFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub source: Option<String>,
    #[arg(long)]
    pub status: Option<LeadStatus>,
    #[arg(long)]
    pub assigned_to: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum TeamsCommand {
    /// List teams with per-member progress
    List {
        /// Also list each member's assigned leads
        #[arg(long)]
        leads: bool,
        /// Only print team headers
        #[arg(long)]
        collapsed: bool,
    },
    /// Department targets and team sizes
    Stats,
    /// Public team totals, no sign-in needed
    Overview,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        department: Option<String>,
    },
    AddMember {
        team_id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        role: String,
        #[arg(long, default_value_t = 0)]
        target: u32,
    },
    RemoveMember { team_id: String, member_id: String },
    /// Record a completion for a member
    Complete { team_id: String, member_id: String },
    /// Convert one of a member's assigned leads
    CompleteLead { lead_id: String },
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    Show,
    Update {
        #[arg(long)]
        full_name: String,
        /// Image file to upload as the avatar
        #[arg(long)]
        avatar: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ThemeCommand {
    List,
    /// Show the current theme and palette
    Show {
        #[arg(long)]
        dark: bool,
    },
    Set { id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PeriodArg {
    Weekly,
    Monthly,
    Yearly,
}

impl From<PeriodArg> for TrendPeriod {
    fn from(period: PeriodArg) -> Self {
        match period {
            PeriodArg::Weekly => TrendPeriod::Weekly,
            PeriodArg::Monthly => TrendPeriod::Monthly,
            PeriodArg::Yearly => TrendPeriod::Yearly,
        }
    }
}

/// Connections shared by every command.
struct Context {
    api: ApiClient,
    session: SessionStore,
    stored: Session,
}

impl Context {
    async fn open(config: &Config) -> CrmResult<Self> {
        let pool = init_database(&config.session_path).await?;
        let session = SessionStore::new(pool);
        let mut api = ApiClient::new(&config.api_url, config.request_timeout)?;
        let stored = auth::restore_session(&mut api, &session).await?;
        tracing::debug!(signed_in = stored.is_signed_in(), "Session restored");
        Ok(Self {
            api,
            session,
            stored,
        })
    }

    fn leads_page(&self) -> LeadsPage {
        LeadsPage::new(self.api.clone(), self.session.clone())
    }

    fn sales_team_page(&self) -> SalesTeamPage {
        SalesTeamPage::new(self.api.clone(), self.session.clone())
    }
}

pub async fn run(cli: Cli, config: Config) -> CrmResult<()> {
    let mut ctx = Context::open(&config).await?;

    match cli.command {
        Command::Signin { email, password } => {
            let user = auth::sign_in(&mut ctx.api, &ctx.session, &email, &password).await?;
            println!("Signed in as {} <{}>", user.full_name, user.email);
        }
        Command::Signup {
            full_name,
            email,
            password,
            confirm_password,
        } => {
            let form = SignUpForm {
                full_name,
                email,
                password,
                confirm_password,
            };
            println!("{}", auth::sign_up(&ctx.api, form).await?);
        }
        Command::ForgotPassword { email } => {
            println!("{}", auth::forgot_password(&ctx.api, &email).await?);
        }
        Command::ResetPassword {
            token,
            password,
            confirm_password,
        } => {
            let message =
                auth::reset_password(&ctx.api, &token, &password, &confirm_password).await?;
            println!("{}", message);
        }
        Command::Signout => {
            auth::sign_out(&mut ctx.api, &ctx.session).await?;
            println!("Signed out");
        }
        Command::Leads(command) => run_leads(&ctx, command).await?,
        Command::Teams(command) => run_teams(&ctx, command).await?,
        Command::Dashboard { period } => {
            let metrics = ctx.api.dashboard().await?;
            println!("Total leads:   {}", metrics.total_leads);
            println!("New this week: {}", metrics.new_this_week);
            println!();
            println!("{:<12} {:>8} {:>12}", "Period", "Leads", "Conversions");
            for point in metrics.trend(period.into()) {
                println!("{:<12} {:>8} {:>12}", point.label, point.leads, point.conversions);
            }
            if !metrics.source_data.is_empty() {
                println!();
                for slice in &metrics.source_data {
                    println!("{:<16} {}", slice.name, slice.value);
                }
            }
        }
        Command::Profile(ProfileCommand::Show) => {
            let profile = settings::load_profile(&ctx.api, &ctx.session).await?;
            println!("Name:  {}", profile.full_name);
            println!("Email: {}", profile.email);
            if let Some(role) = &profile.role {
                println!("Role:  {}", role);
            }
            println!("Theme: {}", Theme::resolve(profile.theme.as_deref()).name);
        }
        Command::Profile(ProfileCommand::Update { full_name, avatar }) => {
            let avatar = match avatar {
                Some(path) => Some(read_avatar(path).await?),
                None => None,
            };
            let profile = settings::update_profile(&ctx.api, &ctx.session, &full_name, avatar).await?;
            println!("Profile updated: {}", profile.full_name);
        }
        Command::Theme(ThemeCommand::List) => {
            let current = settings::current_theme(&ctx.stored);
            for theme in THEMES {
                let marker = if theme.id == current.id { "*" } else { " " };
                println!("{} {:<14} {:<9} {}", marker, theme.id, theme.name, theme.description);
            }
        }
        Command::Theme(ThemeCommand::Show { dark }) => {
            let theme = settings::current_theme(&ctx.stored);
            let appearance = if dark {
                Appearance::Dark
            } else {
                Appearance::default()
            };
            println!("{} ({})", theme.name, theme.id);
            println!("primary:    {}", theme.primary);
            println!("background: {}", theme.primary_bg);
            println!("gradient:   {}", theme.gradient);
            let palette = appearance.palette();
            println!("card:       {}", palette.card_bg);
            println!("text:       {}", palette.text);
            println!("muted:      {}", palette.text_muted);
        }
        Command::Theme(ThemeCommand::Set { id }) => {
            let theme = settings::set_theme(&ctx.api, &ctx.session, &id).await?;
            println!("Theme set to {}", theme.name);
        }
    }

    Ok(())
}

async fn run_leads(ctx: &Context, command: LeadsCommand) -> CrmResult<()> {
    let mut page = ctx.leads_page();

    match command {
        LeadsCommand::Add(fields) => {
            let draft = LeadDraft {
                source: LeadSource::from(fields.source),
                status: fields.status,
                assigned_to: fields.assigned_to,
                ..LeadDraft::new(fields.name, fields.email, fields.phone)
            };
            let lead = page.create(draft).await?;
            println!("{}", lead.id);
        }
        LeadsCommand::List {
            search,
            status,
            desc,
        } => {
            page.refresh().await?;
            let direction = if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            println!("{:<26} {:<24} {:<30} {:<14} {}", "ID", "Name", "Email", "Source", "Status");
            for lead in page.visible(&search, status, direction) {
                println!(
                    "{:<26} {:<24} {:<30} {:<14} {}",
                    lead.id, lead.name, lead.email, lead.source, lead.status
                );
            }
        }
        LeadsCommand::Show { id } => {
            page.refresh().await?;
            println!("{}", page.summary(&id)?);
        }
        LeadsCommand::Update { id, fields } => {
            page.refresh().await?;
            let mut draft = LeadDraft::from(page.store().require(&id)?);
            if let Some(name) = fields.name {
                draft.name = name;
            }
            if let Some(email) = fields.email {
                draft.email = email;
            }
            if let Some(phone) = fields.phone {
                draft.phone = phone;
            }
            if let Some(source) = fields.source {
                draft.source = LeadSource::from(source);
            }
            if let Some(status) = fields.status {
                draft.status = status;
            }
            if fields.assigned_to.is_some() {
                draft.assigned_to = fields.assigned_to;
            }
            page.update(&id, draft).await?;
        }
        LeadsCommand::Delete { id } => {
            page.refresh().await?;
            page.delete(&id).await?;
        }
        LeadsCommand::Archive { id } => {
            page.refresh().await?;
            page.archive(&id).await?;
        }
        LeadsCommand::Restore { id } => {
            page.refresh().await?;
            page.restore(&id).await?;
        }
        LeadsCommand::Convert { id } => {
            page.refresh().await?;
            page.convert(&id).await?;
        }
        LeadsCommand::SetStatus { id, status } => {
            page.refresh().await?;
            page.set_status(&id, status).await?;
        }
        LeadsCommand::ToggleArchive { id } => {
            page.refresh().await?;
            let lead = page.toggle_archive(&id).await?;
            println!("{} is now {}", lead.id, lead.status);
        }
        LeadsCommand::Export { output } => {
            page.refresh().await?;
            let json = page.export_json()?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json).await?;
                    println!("Exported {} leads to {}", page.store().len(), path.display());
                }
                None => println!("{}", json),
            }
        }
    }

    print_notices(page.notifier());
    Ok(())
}

async fn run_teams(ctx: &Context, command: TeamsCommand) -> CrmResult<()> {
    let mut page = ctx.sales_team_page();

    match command {
        TeamsCommand::List { leads, collapsed } => {
            page.refresh().await?;
            if !collapsed {
                let team_ids: Vec<String> = page.teams().iter().map(|t| t.id.clone()).collect();
                for id in &team_ids {
                    page.toggle_team(id);
                }
            }
            if leads {
                let member_ids: Vec<String> = page
                    .teams()
                    .iter()
                    .flat_map(|t| t.members.iter().map(|m| m.id.clone()))
                    .collect();
                for id in &member_ids {
                    page.toggle_member_leads(id);
                }
            }
            for team in page.teams() {
                let department = team.department.as_deref().unwrap_or("-");
                println!("{} [{}] ({})", team.team_name, department, team.id);
                if !page.view().is_team_expanded(&team.id) {
                    continue;
                }
                for stats in page.member_stats(&team.id) {
                    print!(
                        "  {:<20} {:>3}/{:<3} {:>3}%  {:?}",
                        stats.name, stats.completed, stats.target, stats.percentage, stats.band
                    );
                    if let Some(counter) = stats.stale_counter {
                        print!("  (server counter: {})", counter);
                    }
                    println!();
                    if let Some(assigned) = page.visible_member_leads(&stats.member_id) {
                        for lead in assigned {
                            println!("      - {} <{}> {}", lead.name, lead.email, lead.status);
                        }
                    }
                }
            }
        }
        TeamsCommand::Stats => {
            page.refresh_teams().await?;
            println!("Teams:        {}", page.teams().len());
            println!("Members:      {}", page.total_members());
            println!("Total target: {}", page.total_target());
            println!();
            for entry in page.department_targets() {
                println!("{:<24} {}", entry.department, entry.target);
            }
            println!();
            for share in page.member_distribution() {
                println!("{:<24} {} members", share.team_name, share.members);
            }
        }
        TeamsCommand::Overview => {
            let overview = ctx.api.team_dashboard().await?;
            println!("Teams:        {}", overview.total_teams);
            println!("Members:      {}", overview.total_members);
            println!("Total target: {}", overview.total_target);
            println!();
            for entry in department_targets(&overview.teams) {
                println!("{:<24} {}", entry.department, entry.target);
            }
        }
        TeamsCommand::Create { name, department } => {
            let team = page.create_team(&name, department.as_deref()).await?;
            println!("{}", team.id);
        }
        TeamsCommand::AddMember {
            team_id,
            name,
            role,
            target,
        } => {
            page.add_member(&team_id, &name, &role, target).await?;
        }
        TeamsCommand::RemoveMember { team_id, member_id } => {
            page.remove_member(&team_id, &member_id).await?;
        }
        TeamsCommand::Complete { team_id, member_id } => {
            page.complete_member(&team_id, &member_id).await?;
        }
        TeamsCommand::CompleteLead { lead_id } => {
            page.refresh_leads().await?;
            page.complete_lead(&lead_id).await?;
        }
    }

    print_notices(page.notifier());
    Ok(())
}

async fn read_avatar(path: PathBuf) -> CrmResult<AvatarUpload> {
    let bytes = tokio::fs::read(&path).await?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CrmError::Validation(format!("Invalid avatar path: {}", path.display())))?
        .to_string();
    Ok(AvatarUpload { file_name, bytes })
}

/// Errors are returned to `main`; only confirmations are printed here.
fn print_notices(notifier: &Notifier) {
    for notice in notifier.notices() {
        if notice.kind == NoticeKind::Success {
            println!("{}", notice.message);
        }
    }
}

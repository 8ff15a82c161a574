use contacts::{CallContext, Service, CONTACTS_READONLY_SCOPE, CONTACTS_SCOPE};
use jwt_client::{AuthenticatedClient, AuthenticatedClientBuilder, JwtConfig};
use log::{error, info, warn};
use service::{config::Config, logging::Logger};

fn contacts_scope(readonly: bool) -> &'static str {
    if readonly {
        CONTACTS_READONLY_SCOPE
    } else {
        CONTACTS_SCOPE
    }
}

fn build_client(config: &Config) -> Result<AuthenticatedClient, jwt_client::Error> {
    let builder = match config.keyfile() {
        Some(keyfile) => {
            let jwt_config = JwtConfig::from_keyfile(keyfile, &[contacts_scope(config.readonly)])?;
            match config.subject() {
                Some(subject) => jwt_config.with_subject(subject).client_builder()?,
                None => jwt_config.client_builder()?,
            }
        }
        None => {
            warn!("No KEYFILE configured, sending unauthenticated requests");
            AuthenticatedClientBuilder::new()
        }
    };

    builder.with_timeout(config.timeout()).build()
}

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
    }

    let client = match build_client(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build API client: {e}");
            std::process::exit(1);
        }
    };

    let mut service = Service::new(client).with_base_path(config.base_path());
    if let Some(user_agent) = config.user_agent() {
        service.set_user_agent(user_agent);
    }

    let mut call = service
        .contacts()
        .feed(config.user_id(), config.projection())
        .context(CallContext::new().with_timeout(config.timeout()));
    if let Some(query) = config.query() {
        call = call.query(query);
    }
    if let Some(group) = config.group() {
        call = call.group(group);
    }
    if let Some(max_results) = config.max_results {
        call = call.max_results(max_results);
    }

    info!(
        "Fetching contacts for {} [{}]...",
        config.user_id(),
        config.projection()
    );

    let response = match call.send().await {
        Ok(response) => response,
        Err(e) => {
            error!("Failed to fetch contacts: {e}");
            std::process::exit(1);
        }
    };

    for contact in &response.feed.contacts {
        let email = contact
            .primary_email()
            .map(|email| email.value.as_str())
            .unwrap_or("-");
        let organization = contact
            .organizations
            .first()
            .map(|org| org.name.name.as_str())
            .unwrap_or("-");
        println!("{}\t{}\t{}", contact.title.title, email, organization);
    }

    info!("Fetched {} contacts", response.feed.contacts.len());
}

use jellyplay::config::Settings;
use jellyplay::init_app_dirs;
use jellyplay::jellyfin::{JellyfinClient, MediaItem};
use jellyplay::playback::{AdvanceTarget, PlaybackOrchestrator, SubtitleRequest};
use jellyplay::ui::Cli;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse command-line arguments and initialize CLI
    let cli = Cli::new();
    let args = &cli.args;

    // Initialize application directories
    init_app_dirs()?;

    // Load configuration from file or create default
    let config_path = match &args.config {
        Some(path) => Path::new(path).to_path_buf(),
        None => Settings::default_path(),
    };

    let mut settings = Settings::load(&config_path)?;

    // Override settings with command-line arguments (clap also maps env vars)
    settings.server_url = args.server_url.clone().unwrap_or(settings.server_url);
    settings.api_key = args.api_key.clone().or(settings.api_key);
    settings.username = args.username.clone().or(settings.username);
    let device_id = settings.device_id_or_generate();

    settings.validate()?;
    settings.save(&config_path)?;

    // Initialize Jellyfin client
    let mut jellyfin = JellyfinClient::new(&settings.server_url).with_device_id(&device_id);

    if let Some(password) = &args.password {
        // A password on the command line always re-authenticates
        let username = settings
            .username
            .clone()
            .ok_or("Password provided but no username specified or found.")?;
        println!("Authenticating with username: {}", username);
        let auth_response = jellyfin.authenticate(&username, password).await?;
        settings.user_id = Some(auth_response.user.id.clone());
        settings.api_key = Some(auth_response.access_token.clone());
        settings.save(&config_path)?;
    } else if let Some(api_key) = &settings.api_key {
        println!("Using existing API key for authentication.");
        jellyfin = jellyfin.with_api_key(api_key);
        match &settings.user_id {
            Some(user_id) => jellyfin = jellyfin.with_user_id(user_id),
            None => {
                return Err(
                    "API key found in settings, but User ID is missing. Please re-authenticate."
                        .into(),
                )
            }
        }
    } else if settings.username.is_some() {
        let (username, password) = cli.get_credentials()?;
        let auth_response = jellyfin.authenticate(&username, &password).await?;
        settings.user_id = Some(auth_response.user.id.clone());
        settings.api_key = Some(auth_response.access_token.clone());
        settings.save(&config_path)?;
    } else {
        return Err("Cannot authenticate: No username, password, or API key provided or found.".into());
    }

    let orchestrator = PlaybackOrchestrator::new(Arc::new(jellyfin.clone()));
    let mut session_rx = orchestrator.session_updates();
    let mut audio_rx = orchestrator.audio_updates();

    // Main application loop: browse the library, start a queue from a
    // folder's playable children, then drive the queue interactively.
    println!("Fetching items from server...");
    let mut current_items = match &args.parent_id {
        Some(parent_id) => jellyfin.get_items_by_parent_id(parent_id).await?,
        None => jellyfin.get_items().await?,
    };

    loop {
        cli.display_items(&current_items);

        let selected = match cli.select_item(&current_items) {
            Ok(item) => item.clone(),
            Err(e) => {
                cli.display_error(&*e);
                break;
            }
        };

        // Folders are browsed into, everything else starts a queue
        if selected.is_folder {
            current_items = jellyfin.get_items_by_parent_id(&selected.id).await?;
            continue;
        }

        let playable: Vec<MediaItem> = current_items.iter().filter(|i| !i.is_folder).cloned().collect();
        let start_index = playable
            .iter()
            .position(|i| i.id == selected.id)
            .unwrap_or(0);
        orchestrator.set_queue(playable, start_index).await;

        if let Err(e) = orchestrator.advance(AdvanceTarget::Index(start_index)).await {
            cli.display_error(&e);
            continue;
        }
        show_now_playing(&cli, &mut session_rx, &mut audio_rx);

        // Playback control loop
        loop {
            println!(
                "\nOptions: [n]ext, [p]revious, <number> jump, [s]ubtitle toggle, [t <track>] subtitle track, [b]ack, [q]uit"
            );
            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            let input = input.trim().to_lowercase();

            if input == "b" || input == "back" {
                break;
            }
            if input == "q" || input == "quit" {
                return Ok(());
            }

            let result = match input.as_str() {
                "n" | "next" => orchestrator.advance(AdvanceTarget::Next).await,
                "p" | "previous" => orchestrator.advance(AdvanceTarget::Previous).await,
                "s" => {
                    orchestrator.toggle_subtitle_track();
                    Ok(())
                }
                other => {
                    if let Some(track) = other
                        .strip_prefix("t ")
                        .and_then(|t| t.trim().parse::<i32>().ok())
                    {
                        let request = if track < 0 {
                            SubtitleRequest::NoSubtitle
                        } else {
                            SubtitleRequest::Track(track)
                        };
                        orchestrator.change_subtitle_track(request);
                        Ok(())
                    } else if let Ok(number) = other.parse::<usize>() {
                        orchestrator
                            .advance(AdvanceTarget::Index(number.saturating_sub(1)))
                            .await
                    } else {
                        Ok(())
                    }
                }
            };

            match result {
                Ok(()) => show_now_playing(&cli, &mut session_rx, &mut audio_rx),
                Err(e) => cli.display_error(&e),
            }
        }
    }

    Ok(())
}

/// Prints whichever projection the last advance committed to.
fn show_now_playing(
    cli: &Cli,
    session_rx: &mut watch::Receiver<Option<jellyplay::playback::PlaybackSession>>,
    audio_rx: &mut watch::Receiver<Option<jellyplay::playback::AudioNowPlaying>>,
) {
    if audio_rx.has_changed().unwrap_or(false) {
        if let Some(audio) = audio_rx.borrow_and_update().clone() {
            cli.display_audio(&audio);
            return;
        }
    }
    if let Some(session) = session_rx.borrow_and_update().clone() {
        cli.display_session(&session);
    }
}

use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    ai::{estimate_cost, GenerationRequest},
    catalog,
    flow::ImageSlots,
    AiImageClient, AppStateStore, GenerationOutcome, ImageGenerator, ImageRef, Orientation,
    Screen, SessionParams, TemplateStyle, Wizard,
};
use shared::{
    domain::{Brand, TemplateId},
    protocol::{ImageSize, Quality},
};
use storage::Storage;
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, normalize_database_url, Settings};

#[derive(Parser, Debug)]
#[command(about = "Drive the phone case design flow from the command line")]
struct Cli {
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long)]
    ai_base_url: Option<String>,
    #[arg(long)]
    state_key: Option<String>,
    /// Kiosk entry URL, e.g. `https://kiosk.local/?session=abc&qr=true`.
    #[arg(long)]
    entry_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk the wizard from welcome to payment with local images.
    Walkthrough {
        #[arg(long, default_value = "iphone")]
        brand: String,
        #[arg(long)]
        model: Option<String>,
        #[arg(long, default_value = "classic")]
        template: String,
        #[arg(long = "image", required = true)]
        images: Vec<PathBuf>,
        #[arg(long)]
        text: Option<String>,
        /// Style, keyword or glitch mode for AI templates.
        #[arg(long)]
        style: Option<String>,
        #[arg(long)]
        team: Option<String>,
        #[arg(long, default_value_t = catalog::DEFAULT_FILM_STRIP_COUNT)]
        strip_count: u8,
        /// Continue past payment through the print queue.
        #[arg(long)]
        pay: bool,
    },
    /// Probe the AI service.
    Health,
    /// List the style options the AI service offers for a template.
    Styles { template_id: String },
    /// Run a single generation against the AI service.
    Generate {
        template_id: String,
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        style: Option<String>,
        #[arg(long)]
        team: Option<String>,
        #[arg(long, default_value = "medium")]
        quality: String,
        #[arg(long, default_value = "1024x1024")]
        size: String,
    },
    /// Print the rough cost of one generation.
    Estimate {
        #[arg(long, default_value = "medium")]
        quality: String,
        #[arg(long, default_value = "1024x1024")]
        size: String,
        #[arg(long)]
        reference: bool,
    },
    /// Print the persisted order state.
    ShowState,
    /// Clear the order, keeping the session.
    Reset,
    /// Print the effective settings.
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = apply_cli_overrides(load_settings(), &cli);
    let client = AiImageClient::new(settings.ai_base_url.clone());

    match cli.command {
        Command::Health => {
            let health = client
                .health()
                .await
                .map_err(|err| anyhow!(err.user_message()))?;
            println!("{}", serde_json::to_string_pretty(&health)?);
        }
        Command::Styles { template_id } => {
            let catalog = client
                .template_styles(&TemplateId::new(template_id))
                .await
                .map_err(|err| anyhow!(err.user_message()))?;
            for entry in catalog.entries() {
                println!("{entry}");
            }
        }
        Command::Generate {
            template_id,
            image,
            style,
            team,
            quality,
            size,
        } => {
            let style = template_style(&template_id, style, team)?;
            let image = ImageRef::read_file(&image).await?.decode()?;
            let request = GenerationRequest::for_style(&style, Some(image))
                .with_quality(parse_quality(&quality)?)
                .with_size(parse_size(&size)?);
            let response = client
                .generate_image(request)
                .await
                .map_err(|err| anyhow!(err.user_message()))?;
            if !response.success {
                bail!("Generation failed - no success flag");
            }
            println!("{}", client.image_url(&response.filename));
        }
        Command::Estimate {
            quality,
            size,
            reference,
        } => {
            let estimate = estimate_cost(parse_quality(&quality)?, parse_size(&size)?, reference);
            println!("${:.4} ({})", estimate.total_cost, estimate.breakdown);
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Command::ShowState => {
            let store = open_store(&settings, cli.entry_url.as_deref()).await?;
            let state = store.snapshot().await;
            println!("{}", serde_json::to_string_pretty(&*state)?);
        }
        Command::Reset => {
            let store = open_store(&settings, cli.entry_url.as_deref()).await?;
            store.reset_state().await?;
            println!("order state cleared (key={})", store.key());
        }
        Command::Walkthrough {
            brand,
            model,
            template,
            images,
            text,
            style,
            team,
            strip_count,
            pay,
        } => {
            let store = open_store(&settings, cli.entry_url.as_deref()).await?;
            let plan = WalkthroughPlan {
                brand: Brand::parse(&brand).with_context(|| format!("unknown brand '{brand}'"))?,
                model,
                template,
                images: read_images(&images).await?,
                text,
                style,
                team,
                strip_count,
                pay,
            };
            let status_log = log_status_changes(&store);
            let wizard = Wizard::with_generator(store, Arc::new(client))
                .with_initial_credits(settings.ai_credits);
            let result = walkthrough(wizard, plan).await;
            status_log.abort();
            result?;
        }
    }

    Ok(())
}

fn apply_cli_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(v) = &cli.database_url {
        settings.database_url = normalize_database_url(v);
    }
    if let Some(v) = &cli.ai_base_url {
        settings.ai_base_url = v.clone();
    }
    if let Some(v) = &cli.state_key {
        settings.state_key = v.clone();
    }
    settings
}

async fn open_store(settings: &Settings, entry_url: Option<&str>) -> Result<Arc<AppStateStore>> {
    let database_url = &settings.database_url;
    let storage = Storage::new(database_url).await.map_err(|error| {
        error!(
            %database_url,
            error = %format!("{error:#}"),
            "failed to open SQLite database; verify the path and permissions"
        );
        error
    })?;
    let session = match entry_url {
        Some(url) => SessionParams::from_url(url)
            .with_context(|| format!("invalid entry url '{url}'"))?,
        None => SessionParams::default(),
    };
    AppStateStore::open(Arc::new(storage), settings.state_key.clone(), session).await
}

fn log_status_changes(store: &AppStateStore) -> JoinHandle<()> {
    let mut events = store.subscribe();
    tokio::spawn(async move {
        let mut last = None;
        loop {
            match events.recv().await {
                Ok(state) => {
                    if last != Some(state.order_status) {
                        info!(
                            status = %state.order_status,
                            order_number = ?state.order_number,
                            "order: status changed"
                        );
                        last = Some(state.order_status);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "order: status log fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

async fn read_images(paths: &[PathBuf]) -> Result<Vec<ImageRef>> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        images.push(ImageRef::read_file(path).await?);
    }
    Ok(images)
}

fn parse_quality(value: &str) -> Result<Quality> {
    match value.trim().to_ascii_lowercase().as_str() {
        "low" => Ok(Quality::Low),
        "medium" => Ok(Quality::Medium),
        "high" => Ok(Quality::High),
        other => bail!("unknown quality '{other}' (expected low, medium or high)"),
    }
}

fn parse_size(value: &str) -> Result<ImageSize> {
    ImageSize::parse(value).with_context(|| format!("unknown image size '{value}'"))
}

fn template_style(
    template_id: &str,
    style: Option<String>,
    team: Option<String>,
) -> Result<TemplateStyle> {
    let pick = |fallback: &str| style.clone().unwrap_or_else(|| fallback.to_string());
    let style = match template_id {
        "retro-remix" => TemplateStyle::RetroRemix {
            keyword: pick(catalog::RETRO_KEYWORDS[0]),
            optional_text: String::new(),
        },
        "funny-toon" => TemplateStyle::FunnyToon {
            style: pick(catalog::TOON_STYLES[0]),
        },
        "cover-shoot" => TemplateStyle::CoverShoot {
            style: pick(catalog::COVER_STYLES[0]),
        },
        "glitch-pro" => TemplateStyle::GlitchPro {
            mode: pick(catalog::GLITCH_MODES[0]),
        },
        "footy-fan" => TemplateStyle::FootyFan {
            team: team.unwrap_or_else(|| catalog::DEFAULT_TEAM.to_string()),
            style: pick(catalog::FOOTY_STYLE_PRESETS[0]),
        },
        other => bail!("template '{other}' has no AI generation"),
    };
    Ok(style)
}

struct WalkthroughPlan {
    brand: Brand,
    model: Option<String>,
    template: String,
    images: Vec<ImageRef>,
    text: Option<String>,
    style: Option<String>,
    team: Option<String>,
    strip_count: u8,
    pay: bool,
}

async fn walkthrough(mut wizard: Wizard, plan: WalkthroughPlan) -> Result<()> {
    let first_image = plan
        .images
        .first()
        .cloned()
        .context("at least one --image is required")?;
    wizard.store().reset_state().await?;

    loop {
        let screen = wizard.screen();
        match screen {
            Screen::PhoneBrand => wizard.select_brand(plan.brand)?,
            Screen::IphoneModel | Screen::GoogleModel | Screen::SamsungModel => {
                if let Some(model) = &plan.model {
                    wizard.select_model(model)?;
                }
            }
            Screen::TemplateSelection => wizard.select_template(&plan.template)?,
            Screen::FilmStrip => wizard.choose_strip_count(plan.strip_count)?,
            Screen::MultiImageUpload | Screen::FilmStripUpload => {
                let slots = wizard.draft().slots.as_ref().map_or(0, ImageSlots::len);
                for index in 0..slots {
                    wizard.select_slot(index)?;
                    let image = plan.images[index % plan.images.len()].clone();
                    wizard.upload_slot_image(image, Orientation::Unknown)?;
                }
            }
            Screen::PhonePreview
            | Screen::RetroRemix
            | Screen::FunnyToon
            | Screen::CoverShoot
            | Screen::Glitch
            | Screen::FootyFan => {
                if wizard.draft().image.is_none() {
                    wizard.upload_image(first_image.clone())?;
                }
                match (screen, &plan.style, &plan.team) {
                    (Screen::RetroRemix, Some(keyword), _) => wizard.set_keyword(keyword)?,
                    (Screen::FunnyToon | Screen::CoverShoot | Screen::Glitch, Some(style), _) => {
                        wizard.choose_style(style)?
                    }
                    (Screen::FootyFan, _, Some(team)) => wizard.set_team(team)?,
                    _ => {}
                }
            }
            Screen::FootyFanStyle => {
                if let Some(style) = &plan.style {
                    if catalog::FOOTY_STYLE_PRESETS.contains(&style.as_str()) {
                        wizard.choose_style(style)?;
                    } else {
                        wizard.set_custom_style(style)?;
                    }
                }
            }
            Screen::AiGenerate | Screen::FootyFanGenerate => {
                match wizard.await_generation().await {
                    Some(GenerationOutcome::Generated { image, .. }) => {
                        println!("generated {image}");
                    }
                    Some(GenerationOutcome::Failed { message, .. }) => {
                        println!("generation failed: {message}");
                    }
                    None => {}
                }
                if let Some(diagnostic) = wizard.generation().and_then(|g| g.diagnostic()) {
                    println!("{diagnostic}");
                }
                println!("credits left: {}", wizard.credits().unwrap_or_default());
            }
            Screen::TextInput => {
                if let Some(text) = &plan.text {
                    wizard.set_text(text)?;
                }
            }
            Screen::Payment => {
                let draft = wizard.draft();
                println!(
                    "payment: {} for design {}",
                    draft.price.unwrap_or(catalog::DEFAULT_PAYMENT_PRICE),
                    draft
                        .design_image
                        .as_ref()
                        .map_or_else(|| "<none>".to_string(), ToString::to_string)
                );
                if !plan.pay {
                    break;
                }
            }
            Screen::OrderConfirmed => {
                if let Some(number) = &wizard.draft().order_number {
                    println!("order number {number}");
                }
            }
            Screen::Completion => {
                let state = wizard.store().snapshot().await;
                println!("order status: {}", state.order_status);
                break;
            }
            Screen::Welcome
            | Screen::Qr
            | Screen::FontSelection
            | Screen::TextColorSelection
            | Screen::MultiOrderQueue => {}
        }

        let next = wizard.submit().await?;
        info!(from = %screen, to = %next, "walkthrough: advanced");
        println!("{screen} -> {next}");
    }

    Ok(())
}

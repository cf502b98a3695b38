use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use concesionario::{
    client::{MarcaApi, ModeloApi, RestClient},
    config,
    handlers::common::PaginationParams,
    models::{Marca, Modelo},
    routing::{EntityRoute, NavigationHistory},
    workflow::{track_marca_by_id, ModeloUpdateWorkflow, WorkflowError},
};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = build_client(&cli)?;

    match cli.command {
        Commands::Marca(command) => handle_marca_command(&client, command, cli.json).await?,
        Commands::Modelo(command) => handle_modelo_command(&client, command, cli.json).await?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(name = "concesionario", about = "Manage marcas and modelos over the REST API", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[arg(
        long,
        global = true,
        help = "API base URL; defaults to the configured api_base_url"
    )]
    base_url: Option<String>,
    #[arg(long, global = true, help = "Request timeout in seconds")]
    timeout: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Marca(MarcaCommands),
    #[command(subcommand)]
    Modelo(ModeloCommands),
}

#[derive(Subcommand)]
enum MarcaCommands {
    /// List every marca
    List,
    /// Create a marca
    Create(MarcaCreateArgs),
}

#[derive(Args)]
struct MarcaCreateArgs {
    #[arg(long, help = "Brand name (1-20 characters)")]
    name: String,
}

#[derive(Subcommand)]
enum ModeloCommands {
    /// List one page of modelos
    List(ModeloListArgs),
    /// Show one modelo
    Get(ModeloIdArgs),
    /// Create a modelo through the edit workflow
    Create(ModeloFieldArgs),
    /// Update a modelo through the edit workflow
    Update(ModeloUpdateArgs),
    /// Delete a modelo
    Delete(ModeloIdArgs),
}

#[derive(Args)]
struct ModeloListArgs {
    #[arg(long, help = "Zero-based page index")]
    page: Option<u64>,
    #[arg(long, help = "Page size")]
    size: Option<u64>,
}

#[derive(Args)]
struct ModeloIdArgs {
    id: i64,
}

#[derive(Args, Default)]
struct ModeloFieldArgs {
    #[arg(long, help = "Model name (5-50 characters)")]
    modelo: Option<String>,
    #[arg(long)]
    color: Option<String>,
    #[arg(long)]
    potencia: Option<i32>,
    #[arg(long)]
    plazas: Option<i32>,
    #[arg(long)]
    precio: Option<f64>,
    #[arg(long, help = "Id of an existing marca")]
    marca_id: Option<i64>,
    #[arg(long)]
    numero_serie: Option<String>,
}

#[derive(Args)]
struct ModeloUpdateArgs {
    id: i64,
    #[command(flatten)]
    fields: ModeloFieldArgs,
}

fn build_client(cli: &Cli) -> Result<RestClient> {
    let base_url;
    let timeout;
    match config::load_config() {
        Ok(cfg) => {
            config::init_tracing(cfg.log_level(), cfg.log_json);
            base_url = cli.base_url.clone().unwrap_or(cfg.api_base_url.clone());
            timeout = cli.timeout.map(Duration::from_secs).unwrap_or(cfg.client_timeout());
        }
        Err(err) => {
            config::init_tracing("warn", false);
            let Some(url) = cli.base_url.clone() else {
                return Err(err).context("failed to load application config");
            };
            debug!(error = %err, "config unavailable, using command-line base URL");
            base_url = url;
            timeout = Duration::from_secs(cli.timeout.unwrap_or(10));
        }
    }

    RestClient::new(&base_url, timeout).context("failed to build API client")
}

async fn handle_marca_command(
    client: &RestClient,
    command: MarcaCommands,
    json: bool,
) -> Result<()> {
    match command {
        MarcaCommands::List => {
            let marcas = MarcaApi::query(client)
                .await
                .context("failed to list marcas")?;
            if json {
                print_json(&marcas)?;
            } else if marcas.is_empty() {
                println!("No marcas found");
            } else {
                marcas.iter().for_each(render_marca);
            }
        }
        MarcaCommands::Create(args) => {
            let created = MarcaApi::create(client, Marca::new(None, args.name))
                .await
                .context("failed to create marca")?;
            if json {
                print_json(&created)?;
            } else {
                println!("Created marca:");
                render_marca(&created);
            }
        }
    }
    Ok(())
}

async fn handle_modelo_command(
    client: &RestClient,
    command: ModeloCommands,
    json: bool,
) -> Result<()> {
    match command {
        ModeloCommands::List(args) => {
            let params = PaginationParams {
                page: args.page,
                size: args.size,
            };
            let modelos = ModeloApi::query(client, params)
                .await
                .context("failed to list modelos")?;
            if json {
                print_json(&modelos)?;
            } else if modelos.is_empty() {
                println!("No modelos found");
            } else {
                modelos.iter().for_each(render_modelo);
            }
        }
        ModeloCommands::Get(args) => {
            let modelo = ModeloApi::find(client, args.id)
                .await
                .with_context(|| format!("failed to fetch modelo {}", args.id))?;
            if json {
                print_json(&modelo)?;
            } else {
                render_modelo(&modelo);
            }
        }
        ModeloCommands::Create(fields) => {
            let saved = edit_modelo(client, Modelo::default(), fields).await?;
            report_saved("Created", &saved, json)?;
        }
        ModeloCommands::Update(args) => {
            let record = ModeloApi::find(client, args.id)
                .await
                .with_context(|| format!("failed to fetch modelo {}", args.id))?;
            let saved = edit_modelo(client, record, args.fields).await?;
            report_saved("Updated", &saved, json)?;
        }
        ModeloCommands::Delete(args) => {
            ModeloApi::delete(client, args.id)
                .await
                .with_context(|| format!("failed to delete modelo {}", args.id))?;
            if json {
                print_json(&serde_json::json!({ "deleted": args.id }))?;
            } else {
                println!("Deleted modelo {}", args.id);
            }
        }
    }
    Ok(())
}

/// Runs the edit workflow for `record` with the command-line values
/// overlaid on the form.
async fn edit_modelo(
    client: &RestClient,
    record: Modelo,
    fields: ModeloFieldArgs,
) -> Result<Modelo> {
    let route = EntityRoute::Modelo;
    let mut history = NavigationHistory::new();
    history.push(format!("/{}", route));
    history.push(match record.id {
        Some(id) => format!("/{}/{}/edit", route, id),
        None => format!("/{}/new", route),
    });

    let mut workflow = ModeloUpdateWorkflow::new(client.clone(), client.clone(), &mut history);
    if let Err(err) = workflow.initialize(&record).await {
        warn!(error = %err, "continuing without the full marca list");
    }

    apply_fields(&mut workflow, fields)?;

    match workflow.submit().await {
        Ok(saved) => Ok(saved),
        Err(WorkflowError::Validation(errors)) => {
            for (field, field_errors) in errors.field_errors() {
                for err in field_errors {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    eprintln!("{}: {}", field, message);
                }
            }
            bail!("modelo form is invalid")
        }
        Err(err) => Err(anyhow!(err)),
    }
}

fn apply_fields<M, S, N>(
    workflow: &mut ModeloUpdateWorkflow<M, S, N>,
    fields: ModeloFieldArgs,
) -> Result<()>
where
    M: MarcaApi,
    S: ModeloApi,
    N: concesionario::routing::Navigator,
{
    let selected_marca = match fields.marca_id {
        Some(marca_id) => Some(
            workflow
                .marcas_shared_collection()
                .iter()
                .find(|m| m.id.is_some() && track_marca_by_id(m) == marca_id)
                .cloned()
                .ok_or_else(|| anyhow!("marca {} is not among the available options", marca_id))?,
        ),
        None => None,
    };

    let form = workflow.edit_form_mut();
    if let Some(modelo) = fields.modelo {
        form.modelo.set(Some(modelo));
    }
    if let Some(color) = fields.color {
        form.color.set(Some(color));
    }
    if let Some(potencia) = fields.potencia {
        form.potencia.set(Some(potencia));
    }
    if let Some(plazas) = fields.plazas {
        form.plazas.set(Some(plazas));
    }
    if let Some(precio) = fields.precio {
        form.precio.set(Some(precio));
    }
    if let Some(marca) = selected_marca {
        form.marca.set(Some(marca));
    }
    if let Some(numero_serie) = fields.numero_serie {
        form.numero_serie.set(Some(numero_serie));
    }
    Ok(())
}

fn report_saved(verb: &str, modelo: &Modelo, json: bool) -> Result<()> {
    if json {
        print_json(modelo)
    } else {
        println!("{} modelo:", verb);
        render_modelo(modelo);
        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn display<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn render_marca(marca: &Marca) {
    println!(
        "- Marca {} • {}",
        display(marca.id),
        marca.marca.as_deref().unwrap_or("-")
    );
}

fn render_modelo(modelo: &Modelo) {
    println!(
        "- Modelo {} • {} • marca {} • color {} • {} CV • {} plazas • precio {} • serie {}",
        display(modelo.id),
        modelo.modelo.as_deref().unwrap_or("-"),
        modelo
            .marca
            .as_ref()
            .and_then(|m| m.marca.as_deref())
            .unwrap_or("-"),
        modelo.color.as_deref().unwrap_or("-"),
        display(modelo.potencia),
        display(modelo.plazas),
        display(modelo.precio),
        modelo.numero_serie.as_deref().unwrap_or("-"),
    );
}

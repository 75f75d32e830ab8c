use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

#[derive(Parser)]
#[command(name = "soap-cli")]
#[command(about = "Send SOAP 1.1 requests to a soap-service endpoint", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080/")]
    url: String,

    /// Basic auth user.
    #[arg(long)]
    user: Option<String>,

    /// Basic auth password.
    #[arg(long, requires = "user")]
    password: Option<String>,

    /// Namespace put in front of the action name.
    #[arg(long, default_value = "http://tempuri.org/")]
    namespace: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send an envelope read from a file
    Call {
        /// SOAPAction, without namespace
        action: String,
        /// File holding the complete envelope
        envelope: PathBuf,
    },
    /// Call the sample PutDataBySqh operation
    PutDataBySqh {
        sqh: String,
        #[arg(default_value = "")]
        data: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let (action, body) = match cli.command {
        Commands::Call { action, envelope } => (action, std::fs::read_to_string(envelope)?),
        Commands::PutDataBySqh { sqh, data } => (
            "putDataBySqh".to_string(),
            wrap(&format!(
                "<putDataBySqh xmlns=\"http://tempuri.org/\"><sqh>{}</sqh><data>{}</data></putDataBySqh>",
                escape(&sqh),
                escape(&data)
            )),
        ),
    };

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/xml; charset=utf-8"));
    headers.insert(
        "soapaction",
        HeaderValue::from_str(&format!("\"{}{}\"", cli.namespace, action))?,
    );

    let mut request = client.post(&cli.url).headers(headers).body(body);
    if let Some(user) = cli.user {
        request = request.basic_auth(user, cli.password);
    }

    let res = request.send().await?;
    let status = res.status();
    let text = res.text().await?;

    if status.is_success() {
        println!("{}", text);
    } else {
        eprintln!("Error: endpoint returned status {}", status);
        eprintln!("Response: {}", text);
    }
    Ok(())
}

fn wrap(content: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>{content}</soap:Body></soap:Envelope>"#
    )
}

fn escape(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

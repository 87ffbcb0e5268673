use std::io;
use std::time::Duration;

use twilio_typed::{TwilioClient, VideoGrant, VoiceGrant};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let identity = std::env::var("TWILIO_IDENTITY").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "TWILIO_IDENTITY environment variable is required",
        )
    })?;
    let room = std::env::var("TWILIO_ROOM").unwrap_or_else(|_| "demo-room".to_owned());

    let client = TwilioClient::from_env()?;
    let mut token = client
        .new_access_token()?
        .with_identity(identity)
        .valid_for(Duration::from_secs(3600));
    token.add_grant(VideoGrant::new().room(room))?;
    if let Ok(app_sid) = std::env::var("TWILIO_TWIML_APP_SID") {
        token.add_grant(VoiceGrant::new().allow_incoming().outgoing(app_sid))?;
    }

    println!("{}", token.to_jwt()?);
    Ok(())
}

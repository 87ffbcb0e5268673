use std::io;

use twilio_typed::{
    MessageBody, RawPhoneNumber, SendMessage, SendOptions, Sender, TwilioClient,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let to = std::env::var("TWILIO_TO").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "TWILIO_TO environment variable is required",
        )
    })?;
    let from = std::env::var("TWILIO_FROM").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "TWILIO_FROM environment variable is required",
        )
    })?;
    let body = std::env::var("TWILIO_BODY")
        .unwrap_or_else(|_| "Hello from the twilio-typed demo.".to_owned());

    let client = TwilioClient::from_env()?;
    let request = SendMessage::sms(
        RawPhoneNumber::new(to)?,
        Sender::From(RawPhoneNumber::new(from)?),
        MessageBody::new(body)?,
        SendOptions::default(),
    );

    let sent = client.send_message(request).await?;
    let fetched = client.get_message(&sent.sid).await?;
    println!(
        "sid: {}, status: {:?}, segments: {:?}",
        fetched.sid.as_str(),
        fetched.status,
        fetched.num_segments
    );

    Ok(())
}

use std::sync::Arc;
use std::time::Duration;

use comparebot_core::prelude::*;
use comparebot_core::vendors::scripted::{Script, ScriptedSource};
use futures::StreamExt as _;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CompareError> {
    let source = ScriptedSource::new()
        .script(
            "fast",
            Script::new()
                .text("Borrowing lends ")
                .text("access without ")
                .text("moving ownership.")
                .delay(Duration::from_millis(40)),
        )
        .script(
            "flaky",
            Script::new()
                .text("A borrow is")
                .fail(SourceError::bot(
                    "flaky",
                    "Error communicating with bot flaky",
                    r#"{"text":"rate limited","allow_retry":true}"#,
                ))
                .delay(Duration::from_millis(120)),
        );

    let bot = CompareBot::builder()
        .default_source(Arc::new(source))
        .build()?;

    let query = QueryRequest::new(vec![ProtocolMessage::user("What is borrowing? fast vs flaky")]);
    let mut response = bot.get_response(query)?;
    while let Some(event) = response.next().await {
        match event {
            ResponseEvent::Replace { text } => println!("{text}\n----"),
            ResponseEvent::SuggestedReply { text } => println!("(suggested: {text})"),
        }
    }
    Ok(())
}

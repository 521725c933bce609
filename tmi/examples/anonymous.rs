use async_trait::async_trait;
use tmi::event::ChatMessage;
use tmi::{Config, Dispatcher, Handler};

struct Printer;

#[async_trait]
impl Handler for Printer {
    async fn on_message(&mut self, message: ChatMessage) -> anyhow::Result<()> {
        println!("{} {}: {}", message.channel, message.display_name(), message.text());
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let channel = std::env::args().nth(1).unwrap_or_else(|| "moscowwbish".into());
    let mut conn = tmi::connect(Config::default()).await.unwrap();
    conn.sender.join(&channel).await.unwrap();
    let mut dispatcher = Dispatcher::new(Printer);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("CTRL-C");
                break;
            },
            result = conn.reader.next() => match result {
                Ok(message) if message.command == "PING" => conn.sender.pong(message.param(0)).await.unwrap(),
                Ok(message) => dispatcher.dispatch(&message).await.unwrap(),
                Err(err) => {
                    panic!("{}", err);
                }
            }
        }
    }
}

use crate::game::{ClientAction, ClientGameState};
use crate::input::parse_line;
use crate::rendering::Renderer;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{Packet, HEARTBEAT_INTERVAL_MS, MAX_PACKET_SIZE, PROTOCOL_VERSION};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::interval;

pub struct Client<W: Write = io::Stdout> {
    socket: UdpSocket,
    server_addr: SocketAddr,
    connected: bool,

    game_state: ClientGameState,
    renderer: Renderer<W>,
}

impl Client {
    pub async fn new(server_addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_renderer(server_addr, Renderer::stdout()).await
    }
}

impl<W: Write> Client<W> {
    pub async fn with_renderer(
        server_addr: &str,
        renderer: Renderer<W>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        let server_addr = server_addr.parse()?;

        Ok(Client {
            socket,
            server_addr,
            connected: false,
            game_state: ClientGameState::new(),
            renderer,
        })
    }

    async fn connect(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        info!("Connecting to server...");

        let packet = Packet::Connect {
            client_version: PROTOCOL_VERSION,
        };
        self.send_packet(&packet).await?;

        Ok(())
    }

    async fn send_packet(&self, packet: &Packet) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        self.socket.send_to(&data, self.server_addr).await?;
        Ok(())
    }

    /// Returns false once the server has dropped us
    fn handle_packet(&mut self, packet: Packet) -> bool {
        let keep_running = !matches!(packet, Packet::Disconnected { .. });

        match &packet {
            Packet::Connected { client_id } => {
                info!("Connected! Client ID: {}", client_id);
                self.connected = true;
            }
            Packet::Disconnected { reason } => {
                warn!("Disconnected: {}", reason);
                self.connected = false;
            }
            other => debug!("Received {}", other.name()),
        }

        self.game_state.apply(&packet);
        if let Err(e) = self.renderer.render(&packet, &self.game_state) {
            error!("Failed to write output: {}", e);
        }

        keep_running
    }

    /// Returns false when the user asked to quit
    async fn handle_line(&mut self, line: &str) -> bool {
        let command = match parse_line(line) {
            Ok(Some(command)) => command,
            Ok(None) => return true,
            Err(e) => {
                self.show_notice(&e.to_string());
                return true;
            }
        };

        match self.game_state.action_for(command) {
            ClientAction::Send(packet) => {
                if !self.connected {
                    self.show_notice("Not connected to the server yet");
                } else if let Err(e) = self.send_packet(&packet).await {
                    error!("Error sending {}: {}", packet.name(), e);
                }
            }
            ClientAction::ShowHelp => {
                if let Err(e) = self.renderer.help() {
                    error!("Failed to write output: {}", e);
                }
            }
            ClientAction::Notice(message) => self.show_notice(&message),
            ClientAction::Ignore => {}
            ClientAction::Quit => return false,
        }

        true
    }

    fn show_notice(&mut self, message: &str) {
        if let Err(e) = self.renderer.notice(message) {
            error!("Failed to write output: {}", e);
        }
    }

    /// Reads stdin on its own task so the main loop never blocks on it
    fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
        let (line_tx, line_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line_tx.send(line).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        error!("Error reading input: {}", e);
                        break;
                    }
                }
            }
        });

        line_rx
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.connect().await?;

        let mut lines = Self::spawn_stdin_reader();
        let mut heartbeat_interval = interval(Duration::from_millis(HEARTBEAT_INTERVAL_MS));
        let mut buffer = [0u8; MAX_PACKET_SIZE];

        loop {
            tokio::select! {
                result = self.socket.recv_from(&mut buffer) => {
                    match result {
                        Ok((len, _)) => {
                            if let Ok(packet) = deserialize::<Packet>(&buffer[0..len]) {
                                if !self.handle_packet(packet) {
                                    break;
                                }
                            } else {
                                warn!("Failed to deserialize packet from server");
                            }
                        },
                        Err(e) => error!("Error receiving packet: {}", e),
                    }
                },

                line = lines.recv() => {
                    match line {
                        Some(line) => {
                            if !self.handle_line(&line).await {
                                break;
                            }
                        }
                        None => break,
                    }
                },

                _ = heartbeat_interval.tick() => {
                    if self.connected {
                        if let Err(e) = self.send_packet(&Packet::Heartbeat).await {
                            error!("Error sending heartbeat: {}", e);
                        }
                    }
                },
            }
        }

        if self.connected {
            if let Err(e) = self.send_packet(&Packet::Disconnect).await {
                error!("Error sending disconnect: {}", e);
            }
        }

        Ok(())
    }
}

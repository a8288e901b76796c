//! Scripted client that joins a match and prints what the server sends back.

use bincode::{deserialize, serialize};
use shared::{ClientCommand, Element, Packet, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout_at, Instant};

// Get current timestamp in milliseconds
fn get_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}

async fn send(
    socket: &UdpSocket,
    packet: &Packet,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = serialize(packet)?;
    socket.send_to(&data, addr).await?;
    Ok(())
}

/// Prints everything that arrives within the given duration.
async fn drain(socket: &UdpSocket, buf: &mut [u8], wait: Duration) {
    let deadline = Instant::now() + wait;
    while let Ok(Ok((len, _))) = timeout_at(deadline, socket.recv_from(buf)).await {
        match deserialize::<Packet>(&buf[0..len]) {
            Ok(Packet::CommandAck { sequence, result }) => {
                println!("Ack #{}: ok={} reason={:?}", sequence, result.ok, result.reason);
            }
            Ok(Packet::Events { tick, events }) => {
                for event in events {
                    println!("[tick {}] {:?}", tick, event);
                }
            }
            Ok(Packet::Snapshot { state, .. }) => {
                println!(
                    "Snapshot: phase={} wave={} gold={} base_hp={} enemies={} towers={}",
                    state.phase,
                    state.wave,
                    state.economy.gold,
                    state.base_hp,
                    state.enemies.len(),
                    state.towers.len()
                );
            }
            Ok(other) => println!("Received packet: {:?}", other),
            Err(e) => println!("Failed to deserialize packet: {}", e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create local socket
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    println!("Client socket bound to {}", socket.local_addr()?);

    let server_addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:8080".to_string())
        .parse::<SocketAddr>()?;

    println!("Sending connection request to {}", server_addr);
    send(
        &socket,
        &Packet::Connect {
            client_version: PROTOCOL_VERSION,
        },
        server_addr,
    )
    .await?;

    let mut buf = vec![0u8; 65536];
    let (len, _) = socket.recv_from(&mut buf).await?;
    let client_id = match deserialize::<Packet>(&buf[0..len])? {
        Packet::Connected { client_id } => client_id,
        other => {
            println!("Expected Connected but got: {:?}", other);
            return Ok(());
        }
    };
    println!("Connection accepted with client ID: {}", client_id);

    let script = [
        ClientCommand::JoinGame {
            player_name: format!("tester-{}", client_id),
        },
        ClientCommand::SelectClass {
            element_class: Element::Fire,
        },
        ClientCommand::ReadyUp,
        ClientCommand::PlaceTower {
            config_id: "arrow_tower".to_string(),
            x: 4,
            y: 11,
        },
        ClientCommand::StartWave,
    ];

    for (sequence, command) in script.into_iter().enumerate() {
        println!("Sending command: {:?}", command);
        let packet = Packet::Command {
            sequence: sequence as u32 + 1,
            command,
        };
        send(&socket, &packet, server_addr).await?;
        drain(&socket, &mut buf, Duration::from_millis(300)).await;
    }

    // Watch the wave for a while, keeping the connection alive
    for _ in 0..20 {
        send(
            &socket,
            &Packet::Heartbeat {
                timestamp: get_timestamp(),
            },
            server_addr,
        )
        .await?;
        drain(&socket, &mut buf, Duration::from_millis(500)).await;
        sleep(Duration::from_millis(500)).await;
    }

    println!("Sending disconnect request");
    send(&socket, &Packet::Disconnect, server_addr).await?;
    println!("Test client finished");

    Ok(())
}

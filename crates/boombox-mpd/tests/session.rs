//! Session tests against a scripted in-memory server.
//!
//! The fake server records every command line it receives, so the
//! tests can assert the command/idle envelope: `noidle` before any
//! command issued while subscribed, and never a command in between
//! `idle` and its response.

use std::sync::{Arc, Mutex};

use boombox_mpd::{Entity, MpdError, MpdSession, PlayState};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

/// One scripted exchange: the command line the server expects next
/// and the raw response it sends back (without the trailing newline
/// handling — lines are joined with '\n').
struct Exchange {
    command: &'static str,
    response: &'static [&'static str],
}

fn spawn_server(
    stream: DuplexStream,
    script: Vec<Exchange>,
) -> Arc<Mutex<Vec<String>>> {
    let received = Arc::new(Mutex::new(Vec::new()));
    let log = received.clone();
    tokio::spawn(async move {
        let mut io = BufReader::new(stream);
        io.write_all(b"OK MPD 0.23.5\n").await.unwrap();
        for exchange in script {
            let mut line = String::new();
            io.read_line(&mut line).await.unwrap();
            let line = line.trim_end().to_string();
            log.lock().unwrap().push(line.clone());
            assert_eq!(line, exchange.command, "server got unexpected command");
            for out in exchange.response {
                io.write_all(out.as_bytes()).await.unwrap();
                io.write_all(b"\n").await.unwrap();
            }
            io.flush().await.unwrap();
        }
    });
    received
}

#[tokio::test]
async fn command_cancels_idle_first() {
    let (client, server) = tokio::io::duplex(4096);
    let received = spawn_server(
        server,
        vec![
            Exchange {
                command: "idle",
                // idle produces no output until noidle arrives
                response: &[],
            },
            Exchange {
                command: "noidle",
                response: &["OK"],
            },
            Exchange {
                command: "status",
                response: &["volume: 48", "state: play", "elapsed: 12.0", "OK"],
            },
        ],
    );

    let mut session = MpdSession::open(client).await.unwrap();
    session.enter_idle().await.unwrap();
    assert!(session.is_idle());

    let status = session.status().await.unwrap();
    assert_eq!(status.state, PlayState::Play);
    assert_eq!(status.volume, Some(48));
    assert!(!session.is_idle());

    let log = received.lock().unwrap();
    assert_eq!(*log, vec!["idle", "noidle", "status"]);
}

#[tokio::test]
async fn notification_ends_idle_without_noidle() {
    let (client, server) = tokio::io::duplex(4096);
    let received = spawn_server(
        server,
        vec![
            Exchange {
                command: "idle",
                response: &["changed: player", "OK"],
            },
            Exchange {
                command: "currentsong",
                response: &[
                    "file: podcasts/histoire/ep1.mp3",
                    "Title: Episode 1",
                    "OK",
                ],
            },
        ],
    );

    let mut session = MpdSession::open(client).await.unwrap();
    session.enter_idle().await.unwrap();
    let changed = session.wait_notification().await.unwrap();
    assert_eq!(changed, vec!["player"]);
    assert!(!session.is_idle());

    let song = session.current_song().await.unwrap().unwrap();
    assert_eq!(song.display_name(), "Episode 1");

    // no noidle was needed: the idle response already ended the
    // subscription
    let log = received.lock().unwrap();
    assert_eq!(*log, vec!["idle", "currentsong"]);
}

#[tokio::test]
async fn server_ack_aborts_operation_but_not_session() {
    let (client, server) = tokio::io::duplex(4096);
    spawn_server(
        server,
        vec![
            Exchange {
                command: "lsinfo \"missing\"",
                response: &["ACK [50@0] {lsinfo} No such directory"],
            },
            Exchange {
                command: "status",
                response: &["state: stop", "OK"],
            },
        ],
    );

    let mut session = MpdSession::open(client).await.unwrap();
    let err = session.browse(Some("missing")).await.unwrap_err();
    assert!(matches!(err, MpdError::Server { code: 50, .. }));

    // the connection stays usable after an ACK
    let status = session.status().await.unwrap();
    assert_eq!(status.state, PlayState::Stop);
}

#[tokio::test]
async fn browse_root_keeps_directories_only() {
    let (client, server) = tokio::io::duplex(4096);
    spawn_server(
        server,
        vec![Exchange {
            command: "lsinfo \"/\"",
            response: &[
                "directory: musique",
                "directory: podcasts",
                "file: stray.mp3",
                "OK",
            ],
        }],
    );

    let mut session = MpdSession::open(client).await.unwrap();
    let entries = session.browse(None).await.unwrap();
    assert_eq!(
        entries,
        vec![
            Entity::Directory("musique".to_string()),
            Entity::Directory("podcasts".to_string()),
        ]
    );
}

#[tokio::test]
async fn resume_markers_round_trip() {
    let (client, server) = tokio::io::duplex(4096);
    let received = spawn_server(
        server,
        vec![
            Exchange {
                command: "sticker set song \"podcasts/ep 2.mp3\" played \"95\"",
                response: &["OK"],
            },
            Exchange {
                command: "sticker find song \"\" played",
                response: &[
                    "file: podcasts/ep 2.mp3",
                    "sticker: played=95",
                    "file: podcasts/broken.mp3",
                    "sticker: played=abc",
                    "OK",
                ],
            },
        ],
    );

    let mut session = MpdSession::open(client).await.unwrap();
    session
        .set_resume_marker("podcasts/ep 2.mp3", 95)
        .await
        .unwrap();

    let markers = session.resume_markers().await.unwrap();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].uri, "podcasts/ep 2.mp3");
    assert_eq!(markers[0].seconds, 95);

    assert_eq!(received.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn bad_greeting_is_rejected() {
    let (client, server) = tokio::io::duplex(64);
    tokio::spawn(async move {
        let mut server = server;
        server.write_all(b"HELLO 1.0\n").await.unwrap();
    });
    let err = MpdSession::open(client).await.unwrap_err();
    assert!(matches!(err, MpdError::BadGreeting(_)));
}

// Copyright 2024 The Android Open Source Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The TCP server accepting peer packet streams.
//!
//! Each accepted connection becomes one session with its own reader
//! thread; see [`crate::transport::session`].

use crate::service::SimulationContext;
use crate::transport::session;
use log::{error, info};
use std::net::{Ipv4Addr, SocketAddrV4, TcpListener};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Bind the stream server and start accepting peers. Returns the bound
/// port (useful with port 0) and the acceptor's join handle.
pub fn run_stream_server(
    ctx: Arc<SimulationContext>,
    port: u16,
) -> std::io::Result<(u16, JoinHandle<()>)> {
    let listener = TcpListener::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port))?;
    let local_port = listener.local_addr()?.port();
    info!("packet stream server is listening on: {local_port}");
    let handle = thread::Builder::new().name("stream_server".to_string()).spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let ctx = ctx.clone();
                    let spawned =
                        thread::Builder::new().name("stream_peer".to_string()).spawn(move || {
                            session::handle_peer(&ctx, stream);
                        });
                    if let Err(err) = spawned {
                        error!("failed to spawn session thread: {err}");
                    }
                }
                Err(err) => {
                    error!("failed to accept incoming stream: {err}");
                    break;
                }
            }
        }
    })?;
    Ok((local_port, handle))
}

// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::spawn;
use tokio::time::sleep;

use crate::error::ErrorKind;
use crate::error::ErrorReport;
use crate::error::Fallible;

/// Serves `app` on a free local port, waits until it accepts connections,
/// and returns its base URL.
pub async fn spawn_mock_server(app: Router) -> Fallible<String> {
    let port = portpicker::pick_unused_port()
        .ok_or_else(|| ErrorReport::new(ErrorKind::Io, "no free port"))?;
    let bind = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&bind).await?;
    spawn(async move { axum::serve(listener, app).await });
    loop {
        if let Ok(stream) = TcpStream::connect(&bind).await {
            drop(stream);
            break;
        }
        sleep(Duration::from_millis(1)).await;
    }
    Ok(format!("http://{bind}"))
}

/// A base URL nothing is listening on.
pub fn unreachable_url() -> Fallible<String> {
    let port = portpicker::pick_unused_port()
        .ok_or_else(|| ErrorReport::new(ErrorKind::Io, "no free port"))?;
    Ok(format!("http://127.0.0.1:{port}"))
}

#[cfg(test)]
mod tests {
    use axum::routing::get;

    use super::*;

    #[tokio::test]
    async fn test_spawn_mock_server() -> Fallible<()> {
        let app = Router::new().route("/", get(|| async { "ok" }));
        let url = spawn_mock_server(app).await?;
        let body = reqwest::get(&url).await?.text().await?;
        assert_eq!(body, "ok");
        Ok(())
    }
}

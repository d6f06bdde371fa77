use crate::{cli::local_state, spotify};

pub async fn auth() {
    spotify::auth::auth(local_state().await).await;
}

use stardrop_execution::{decode_player, encode_player, Store, StoreError};
use stardrop_types::casino::Player;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One encoded player per file under a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, player_id: &str) -> Result<PathBuf, StoreError> {
        let valid = !player_id.is_empty()
            && player_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(player_id.to_string()));
        }
        Ok(self.dir.join(format!("{player_id}.player")))
    }
}

impl Store for FileStore {
    async fn load(&self, player_id: &str) -> Result<Option<Player>, StoreError> {
        let path = self.path(player_id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(decode_player(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&mut self, player_id: &str, player: &Player) -> Result<(), StoreError> {
        let path = self.path(player_id)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write then rename so a crash mid-write never leaves a torn file
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, encode_player(player)).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stardrop_execution::mocks::sample_item;
    use stardrop_execution::{mint_item, GameRng};
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("stardrop-store-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_round_trip() {
        let dir = temp_dir();
        let mut store = FileStore::new(&dir);
        assert!(store.load("alice").await.unwrap().is_none());

        let mut player = Player::new(321);
        player.add_item(mint_item(&sample_item(1, 10), &mut GameRng::new(1, 1), 5));
        store.save("alice", &player).await.unwrap();
        assert_eq!(store.load("alice").await.unwrap(), Some(player.clone()));

        player.credit(9);
        store.save("alice", &player).await.unwrap();
        assert_eq!(store.load("alice").await.unwrap(), Some(player));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_path_like_ids() {
        let mut store = FileStore::new(temp_dir());
        for id in ["", "../escape", "a/b", "name.player"] {
            assert!(matches!(
                store.load(id).await,
                Err(StoreError::InvalidKey(_))
            ));
            assert!(matches!(
                store.save(id, &Player::default()).await,
                Err(StoreError::InvalidKey(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_codec_error() {
        let dir = temp_dir();
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("bob.player"), b"\x01\x02")
            .await
            .unwrap();
        let store = FileStore::new(&dir);
        assert!(matches!(store.load("bob").await, Err(StoreError::Codec(_))));
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}

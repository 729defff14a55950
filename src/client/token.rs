use parking_lot::RwLock;

/// 현재 access token (프로세스 메모리에만 보관)
#[derive(Debug, Default)]
pub struct TokenSlot {
    token: RwLock<Option<String>>,
}

impl TokenSlot {
    pub fn get(&self) -> Option<String> {
        self.token.read().clone()
    }

    pub fn set(&self, token: String) {
        *self.token.write() = Some(token);
    }

    pub fn clear(&self) {
        *self.token.write() = None;
    }
}

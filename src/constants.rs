pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "avif"];

pub mod slug {

    pub const LENGTH: usize = 10;

    pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

    /// Attempts before giving up on a collision-free slug.
    pub const MAX_ATTEMPTS: usize = 8;
}

pub mod theme {

    pub const DEFAULT_PRIMARY_COLOR: &str = "#2563eb";

    pub const DEFAULT_BACKGROUND_VALUE: &str = "#f3f4f6";
}

pub mod payment {

    pub const MAX_PERCENT: f64 = 100.0;

    /// Display labels for the well-known method keys.
    pub const LABELS: &[(&str, &str)] = &[
        ("efectivo", "Efectivo"),
        ("transferencia", "Transferencia"),
        ("mercadopago", "Mercado Pago"),
        ("tarjeta", "Tarjeta"),
        ("modo", "Modo"),
        ("otro", "Otro"),
    ];
}

pub mod limits {

    pub const MAX_REORDER_ITEMS: usize = 1000;

    pub const MAX_ORDER_LINES: usize = 200;
}

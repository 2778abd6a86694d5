/// Subdomain prefix of the control server host.
pub const ADMIN_PREFIX: &str = "admin.";

/// Path of the bridge socket on the control server.
pub const BRIDGE_PATH: &str = "/bridge";

/// Derives the control server socket URL from a page hostname.
///
/// The server that hands out the bridge script must compute the same value,
/// so both sides share this function.
///
/// ```text
/// shop.example.com        -> wss://admin.shop.example.com/bridge
/// admin.shop.example.com  -> wss://admin.shop.example.com/bridge
/// ```
pub fn admin_endpoint(hostname: &str) -> String {
	if hostname.starts_with(ADMIN_PREFIX) {
		format!("wss://{hostname}{BRIDGE_PATH}")
	} else {
		format!("wss://{ADMIN_PREFIX}{hostname}{BRIDGE_PATH}")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn prefixes_admin_subdomain() {
		assert_eq!(admin_endpoint("example.com"), "wss://admin.example.com/bridge");
	}

	#[test]
	fn keeps_existing_admin_subdomain() {
		assert_eq!(admin_endpoint("admin.example.com"), "wss://admin.example.com/bridge");
	}

	#[test]
	fn only_checks_leading_label() {
		assert_eq!(
			admin_endpoint("shop.admin.example.com"),
			"wss://admin.shop.admin.example.com/bridge"
		);
	}
}

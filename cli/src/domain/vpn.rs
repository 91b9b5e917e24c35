//! OpenVPN server commands and client-profile rewriting.

/// Shell command that launches the OpenVPN server container on the instance.
#[must_use]
pub fn server_command(image: &str, volume: &str) -> String {
    format!("docker run -v {volume}:/etc/openvpn -d -p 1194:1194/udp --cap-add=NET_ADMIN {image}")
}

/// Shell command that prints the client profile for `user` to stdout.
#[must_use]
pub fn client_profile_command(image: &str, volume: &str, user: &str) -> String {
    format!("docker run -v {volume}:/etc/openvpn --log-driver=none --rm {image} ovpn_getclient {user}")
}

/// Points a generated client profile at the instance's current address.
///
/// The server bakes `server_host` into every `remote` line; the instance's
/// public IP changes on each start, so every occurrence is replaced.
/// An empty `server_host` leaves the profile untouched.
#[must_use]
pub fn rewrite_server_address(profile: &str, server_host: &str, public_ip: &str) -> String {
    if server_host.is_empty() {
        return profile.to_string();
    }
    profile.replace(server_host, public_ip)
}

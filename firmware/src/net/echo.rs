/// TCP echo service (RFC 862), served from the stack context.
use alloc::vec;

use log::{debug, warn};
use smoltcp::iface::{SocketHandle, SocketSet};
use smoltcp::socket::tcp::{self, Socket as TcpSocket};

/// Well-known echo port.
pub const ECHO_PORT: u16 = 7;

const ECHO_BUF_LEN: usize = 2048;
const ECHO_CHUNK: usize = 256;

/// One listening TCP socket that returns whatever it receives.
pub struct EchoService {
    handle: SocketHandle,
    port: u16,
}

impl EchoService {
    pub fn new(sockets: &mut SocketSet<'static>, port: u16) -> Self {
        let rx_buf = tcp::SocketBuffer::new(vec![0u8; ECHO_BUF_LEN]);
        let tx_buf = tcp::SocketBuffer::new(vec![0u8; ECHO_BUF_LEN]);
        let handle = sockets.add(TcpSocket::new(rx_buf, tx_buf));
        Self { handle, port }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn handle(&self) -> SocketHandle {
        self.handle
    }

    /// Re-listen after a close and move pending bytes from rx to tx.
    pub fn service(&mut self, sockets: &mut SocketSet<'static>) {
        let socket = sockets.get_mut::<TcpSocket>(self.handle);

        if !socket.is_open() {
            if let Err(e) = socket.listen(self.port) {
                warn!(target: "net", "echo listen on {} failed: {:?}", self.port, e);
            }
            return;
        }

        while socket.can_recv() && socket.can_send() {
            let room = socket.send_capacity() - socket.send_queue();
            let mut chunk = [0u8; ECHO_CHUNK];
            let want = room.min(chunk.len());
            if want == 0 {
                break;
            }
            let n = match socket.recv_slice(&mut chunk[..want]) {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            if socket.send_slice(&chunk[..n]).is_err() {
                break;
            }
            debug!(target: "net", "echoed {} bytes", n);
        }

        if !socket.may_recv() && socket.may_send() {
            socket.close();
        }
    }
}

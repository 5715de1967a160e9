use s7xg_transport::ByteLink;

use super::Device;
use crate::command::rf;
use crate::error::Result;

impl<L: ByteLink> Device<L> {
    /// Transmit a raw LoRa packet and wait for `radio_tx_ok`.
    pub fn rf_send(&mut self, payload: &[u8]) -> Result<()> {
        self.two_stage(&rf::tx(payload)?, "radio_tx_ok")
    }

    pub fn rf_send_hex(&mut self, payload: &str) -> Result<()> {
        self.two_stage(&rf::tx_hex(payload)?, "radio_tx_ok")
    }

    pub fn rf_send_text(&mut self, text: &str) -> Result<()> {
        self.two_stage(&rf::tx_text(text)?, "radio_tx_ok")
    }

    /// Enable or disable continuous receive. While on, packets arrive as
    /// events collected by [`poll`](Self::poll).
    pub fn rf_receive(&mut self, on: bool) -> Result<()> {
        self.driver.expect_ok(&rf::rx_con(on))
    }

    pub fn rf_freq(&mut self) -> Result<u32> {
        self.driver.execute_scalar(&rf::get_freq())
    }

    pub fn set_rf_freq(&mut self, hz: u32) -> Result<()> {
        self.driver.expect_ok(&rf::set_freq(hz))
    }

    pub fn rf_power(&mut self) -> Result<u8> {
        self.driver.execute_scalar(&rf::get_pwr())
    }

    pub fn set_rf_power(&mut self, dbm: u8) -> Result<()> {
        self.driver.expect_ok(&rf::set_pwr(dbm))
    }

    pub fn rf_spreading_factor(&mut self) -> Result<u8> {
        self.driver.execute_scalar(&rf::get_sf())
    }

    pub fn set_rf_spreading_factor(&mut self, factor: u8) -> Result<()> {
        self.driver.expect_ok(&rf::set_sf(factor)?)
    }

    pub fn set_rf_bandwidth(&mut self, khz: u16) -> Result<()> {
        self.driver.expect_ok(&rf::set_bw(khz))
    }

    pub fn set_rf_coding_rate(&mut self, denominator: u8) -> Result<()> {
        self.driver.expect_ok(&rf::set_cr(denominator)?)
    }

    pub fn set_rf_preamble(&mut self, symbols: u16) -> Result<()> {
        self.driver.expect_ok(&rf::set_prlen(symbols))
    }

    pub fn set_rf_crc(&mut self, on: bool) -> Result<()> {
        self.driver.expect_ok(&rf::set_crc(on))
    }

    pub fn set_rf_iq_invert(&mut self, on: bool) -> Result<()> {
        self.driver.expect_ok(&rf::set_iqi(on))
    }

    pub fn set_rf_sync(&mut self, word: u8) -> Result<()> {
        self.driver.expect_ok(&rf::set_sync(word))
    }

    pub fn set_rf_freq_deviation(&mut self, hz: u16) -> Result<()> {
        self.driver.expect_ok(&rf::set_fdev(hz))
    }

    /// Persist the radio settings.
    pub fn rf_save(&mut self) -> Result<()> {
        self.driver.expect_ok(&rf::save())
    }
}

#[cfg(test)]
mod tests {
    use s7xg_transport::MockLink;

    use super::super::testing::{device, frame, frames};
    use crate::driver::Poll;
    use crate::error::{DriverError, ErrorKind};

    #[test]
    fn send_text_waits_for_radio_tx_ok() {
        let mut link = MockLink::new();
        link.expect("rf tx 48656C6C6F", &frames(&["Ok", "radio_tx_ok"]));
        link.expect("rf tx 00", &frames(&["Ok", "radio_err"]));
        let mut dev = device(link);

        dev.rf_send_text("Hello").unwrap();
        assert!(matches!(
            dev.rf_send(&[0]),
            Err(DriverError::UnexpectedReply { .. })
        ));
    }

    #[test]
    fn empty_payload_is_rejected() {
        let mut dev = device(MockLink::new());
        assert_eq!(dev.rf_send(&[]).unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn continuous_receive_delivers_events() {
        let mut link = MockLink::new();
        link.expect(
            "rf rx_con on",
            &frames(&["Ok", "radio_rx 48656C6C6F -42 7"]),
        );
        let mut dev = device(link);

        // The second frame arrives with the acknowledgement and waits for poll.
        dev.rf_receive(true).unwrap();
        assert_eq!(dev.poll().unwrap(), Poll::Queued);
        let event = dev.next_event().unwrap();
        assert_eq!(event.data.as_ref(), b"Hello");
        assert_eq!((event.rssi, event.snr), (-42, 7));
        assert_eq!(dev.poll().unwrap(), Poll::Idle);
    }

    #[test]
    fn radio_settings() {
        let mut link = MockLink::new();
        link.expect("rf set_sf 9", &frame("Ok"));
        link.expect("rf get_sf", &frame("9"));
        link.expect("rf get_freq", &frame("868100000"));
        let mut dev = device(link);

        dev.set_rf_spreading_factor(9).unwrap();
        assert_eq!(dev.rf_spreading_factor().unwrap(), 9);
        assert_eq!(dev.rf_freq().unwrap(), 868_100_000);
    }
}

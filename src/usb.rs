use embassy_stm32::usb_otg::{self, Driver};
use embassy_stm32::{bind_interrupts, peripherals};
use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use embassy_usb::{Builder, Config, UsbDevice};
use static_cell::StaticCell;

bind_interrupts!(pub struct Irqs {
    OTG_FS => usb_otg::InterruptHandler<peripherals::USB_OTG_FS>;
});

pub type UsbDriver = Driver<'static, peripherals::USB_OTG_FS>;
pub type UsbSerial<'a> = CdcAcmClass<'a, UsbDriver>;

/// Max CDC packet; callers split longer lines.
pub const USB_PACKET: usize = 64;

struct UsbBuffers {
    config_desc: [u8; 256],
    bos_desc: [u8; 256],
    control_buf: [u8; 64],
    ep_out: [u8; 256],
}

static USB_BUFFERS: StaticCell<UsbBuffers> = StaticCell::new();
static CDC_STATE: StaticCell<State<'static>> = StaticCell::new();

#[embassy_executor::task]
pub async fn usb_task(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    device.run().await
}

/// Bring up the OTG FS port as a CDC-ACM debug serial. Call once.
pub fn init(
    usb_periph: peripherals::USB_OTG_FS,
    pa12: peripherals::PA12,
    pa11: peripherals::PA11,
) -> (UsbDevice<'static, UsbDriver>, UsbSerial<'static>) {
    let UsbBuffers {
        config_desc,
        bos_desc,
        control_buf,
        ep_out,
    } = USB_BUFFERS.init(UsbBuffers {
        config_desc: [0; 256],
        bos_desc: [0; 256],
        control_buf: [0; 64],
        ep_out: [0; 256],
    });

    let mut otg_config = usb_otg::Config::default();
    otg_config.vbus_detection = false;
    let driver = Driver::new_fs(usb_periph, Irqs, pa12, pa11, ep_out, otg_config);

    let mut config = Config::new(0xc0de, 0xa1d5);
    config.manufacturer = Some("Air Data");
    config.product = Some("Type 54C Air Data Controller");
    config.serial_number = Some("54C00001");

    let mut builder = Builder::new(driver, config, config_desc, bos_desc, &mut [], control_buf);
    let state = CDC_STATE.init(State::new());
    let class = CdcAcmClass::new(&mut builder, state, USB_PACKET as u16);

    (builder.build(), class)
}

/// Write `bytes` in CDC-sized packets. Drops the line if nobody is listening.
pub async fn write_line(serial: &mut UsbSerial<'static>, bytes: &[u8]) {
    if !serial.dtr() {
        return;
    }
    for chunk in bytes.chunks(USB_PACKET) {
        if serial.write_packet(chunk).await.is_err() {
            return;
        }
    }
}

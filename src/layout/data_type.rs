//! Data type names of the packet header data type field.
//!
//! The upper 5 bits of the data type byte select the basic data type, the lower 3 bits select
//! the format of that data type.

/// Mask which extracts the basic data type from the data type byte.
pub const DTN_TYPE_MASK: u8 = 0xF8;
/// Mask which extracts the format from the data type byte.
pub const DTN_FORMAT_MASK: u8 = 0x07;

/// Basic data type categories, the upper 5 bits of the data type byte.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, num_enum::TryFromPrimitive, num_enum::IntoPrimitive,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[non_exhaustive]
pub enum BasicDataType {
    ComputerGenerated = 0x00,
    Pcm = 0x08,
    Time = 0x10,
    Mil1553 = 0x18,
    Analog = 0x20,
    Discrete = 0x28,
    Message = 0x30,
    Arinc429 = 0x38,
    Video = 0x40,
    Image = 0x48,
    Uart = 0x50,
    Ieee1394 = 0x58,
    Parallel = 0x60,
    Ethernet = 0x68,
    Tspi = 0x70,
    /// CAN bus (format 0) and Fibre Channel (formats 1 and 2).
    CanAndFibreChannel = 0x78,
}

impl BasicDataType {
    /// Basic data type of a raw data type byte. Returns the masked raw value if the category is
    /// unknown.
    #[inline]
    pub fn from_data_type(raw: u8) -> Result<Self, u8> {
        let basic = raw & DTN_TYPE_MASK;
        Self::try_from(basic).map_err(|_| basic)
    }
}

/// All data types known to this library.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, num_enum::TryFromPrimitive, num_enum::IntoPrimitive,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[non_exhaustive]
pub enum DataType {
    /// User defined computer generated data.
    ComputerGeneratedF0 = 0x00,
    /// TMATS setup record.
    ComputerGeneratedF1 = 0x01,
    /// Recording events.
    ComputerGeneratedF2 = 0x02,
    /// Recording index.
    ComputerGeneratedF3 = 0x03,
    /// Streaming configuration records.
    ComputerGeneratedF4 = 0x04,
    PcmF0 = 0x08,
    /// IRIG-106 Chapter 4 and Chapter 8 PCM.
    PcmF1 = 0x09,
    TimeF0 = 0x10,
    /// RCC/GPS/RTC time.
    TimeF1 = 0x11,
    /// Network time.
    TimeF2 = 0x12,
    Mil1553F0 = 0x18,
    /// MIL-STD-1553B bus data.
    Mil1553F1 = 0x19,
    /// 16PP194 bus data.
    Mil1553F2 = 0x1A,
    AnalogF0 = 0x20,
    AnalogF1 = 0x21,
    DiscreteF0 = 0x28,
    DiscreteF1 = 0x29,
    MessageF0 = 0x30,
    Arinc429F0 = 0x38,
    /// MPEG-2/H.264 transport stream.
    VideoF0 = 0x40,
    /// ISO 13818-1 MPEG-2.
    VideoF1 = 0x41,
    /// ISO 14496 MPEG-4 part 10 AVC/H.264.
    VideoF2 = 0x42,
    /// MJPEG.
    VideoF3 = 0x43,
    /// MJPEG-2000.
    VideoF4 = 0x44,
    ImageF0 = 0x48,
    /// Still imagery.
    ImageF1 = 0x49,
    /// Dynamic imagery.
    ImageF2 = 0x4A,
    UartF0 = 0x50,
    Ieee1394F0 = 0x58,
    Ieee1394F1 = 0x59,
    ParallelF0 = 0x60,
    EthernetF0 = 0x68,
    /// Ethernet UDP payload.
    EthernetF1 = 0x69,
    TspiF0 = 0x70,
    TspiF1 = 0x71,
    TspiF2 = 0x72,
    CanBus = 0x78,
    FibreChannelF0 = 0x79,
    FibreChannelF1 = 0x7A,
}

impl DataType {
    #[inline]
    pub fn basic(self) -> BasicDataType {
        match BasicDataType::from_data_type(self.into()) {
            Ok(basic) => basic,
            // Every data type belongs to a known category.
            Err(_) => unreachable!(),
        }
    }

    /// Short mnemonic of the data type.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            DataType::ComputerGeneratedF0 => "CG0",
            DataType::ComputerGeneratedF1 => "TMATS",
            DataType::ComputerGeneratedF2 => "EVENT",
            DataType::ComputerGeneratedF3 => "INDEX",
            DataType::ComputerGeneratedF4 => "STREAMCFG",
            DataType::PcmF0 => "PCM0",
            DataType::PcmF1 => "PCM1",
            DataType::TimeF0 => "TIME0",
            DataType::TimeF1 => "TIME1",
            DataType::TimeF2 => "TIME2",
            DataType::Mil1553F0 => "1553F0",
            DataType::Mil1553F1 => "1553F1",
            DataType::Mil1553F2 => "16PP194",
            DataType::AnalogF0 => "ANA0",
            DataType::AnalogF1 => "ANA1",
            DataType::DiscreteF0 => "DIS0",
            DataType::DiscreteF1 => "DIS1",
            DataType::MessageF0 => "MSG0",
            DataType::Arinc429F0 => "A429",
            DataType::VideoF0 => "VID0",
            DataType::VideoF1 => "VID1",
            DataType::VideoF2 => "VID2",
            DataType::VideoF3 => "VID3",
            DataType::VideoF4 => "VID4",
            DataType::ImageF0 => "IMG0",
            DataType::ImageF1 => "IMG1",
            DataType::ImageF2 => "IMG2",
            DataType::UartF0 => "UART0",
            DataType::Ieee1394F0 => "1394F0",
            DataType::Ieee1394F1 => "1394F1",
            DataType::ParallelF0 => "PAR0",
            DataType::EthernetF0 => "ETH0",
            DataType::EthernetF1 => "ETH1",
            DataType::TspiF0 => "TSPI0",
            DataType::TspiF1 => "TSPI1",
            DataType::TspiF2 => "TSPI2",
            DataType::CanBus => "CAN",
            DataType::FibreChannelF0 => "FC0",
            DataType::FibreChannelF1 => "FC1",
        }
    }
}

/// Mnemonic of a raw data type byte. Unknown data types map to `"error"`.
pub fn data_type_mnemonic(raw: u8) -> &'static str {
    match DataType::try_from(raw) {
        Ok(data_type) => data_type.mnemonic(),
        Err(_) => "error",
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

//! CU16 command and response opcodes

use std::fmt;

use crate::error::{Error, Result};

/// Request opcodes (host to control unit)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Status of the addressed unit
    GetStatus = 0x30,
    
    /// Pulse the lock of the addressed door
    UnlockOne = 0x31,
    
    /// Status of every unit on the bus
    GetAllBus = 0x32,
    
    /// Pulse every lock of the addressed unit
    UnlockAll = 0x33,
    
    /// Set the lock pulse duration (two data bytes, little-endian)
    SetUnlockTime = 0x37,
    
    /// Set the reply delay or the bus baud rate (one data byte)
    SetDelayOrBaud = 0x39,
}

/// Reply opcodes (control unit to host)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Response {
    StatusSingle = 0x35,
    StatusAll = 0x36,
    UnlockTime = 0x38,
}

impl Command {
    /// Reply opcode the control unit answers this command with
    ///
    /// `SetDelayOrBaud` has no documented reply.
    pub fn expected_response(self) -> Option<Response> {
        match self {
            Self::GetStatus | Self::UnlockOne => Some(Response::StatusSingle),
            Self::GetAllBus | Self::UnlockAll => Some(Response::StatusAll),
            Self::SetUnlockTime => Some(Response::UnlockTime),
            Self::SetDelayOrBaud => None,
        }
    }
    
    /// Get command name
    pub fn name(self) -> &'static str {
        match self {
            Self::GetStatus => "GET_STATUS",
            Self::UnlockOne => "UNLOCK_ONE",
            Self::GetAllBus => "GET_ALL_BUS",
            Self::UnlockAll => "UNLOCK_ALL",
            Self::SetUnlockTime => "SET_UNLOCK_TIME",
            Self::SetDelayOrBaud => "SET_DELAY_OR_BAUD",
        }
    }
}

impl Response {
    /// Check if this reply carries the 9-byte door status layout
    pub fn is_status(self) -> bool {
        matches!(self, Self::StatusSingle | Self::StatusAll)
    }
    
    /// Get response name
    pub fn name(self) -> &'static str {
        match self {
            Self::StatusSingle => "STATUS_SINGLE",
            Self::StatusAll => "STATUS_ALL",
            Self::UnlockTime => "UNLOCK_TIME",
        }
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> u8 {
        cmd as u8
    }
}

impl From<Response> for u8 {
    fn from(resp: Response) -> u8 {
        resp as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = Error;
    
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x30 => Ok(Self::GetStatus),
            0x31 => Ok(Self::UnlockOne),
            0x32 => Ok(Self::GetAllBus),
            0x33 => Ok(Self::UnlockAll),
            0x37 => Ok(Self::SetUnlockTime),
            0x39 => Ok(Self::SetDelayOrBaud),
            _ => Err(Error::UnknownCommand(value)),
        }
    }
}

impl TryFrom<u8> for Response {
    type Error = Error;
    
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x35 => Ok(Self::StatusSingle),
            0x36 => Ok(Self::StatusAll),
            0x38 => Ok(Self::UnlockTime),
            _ => Err(Error::UnexpectedOpcode(value)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_command_conversion() {
        assert_eq!(u8::from(Command::GetStatus), 0x30);
        assert_eq!(u8::from(Command::SetDelayOrBaud), 0x39);
        assert_eq!(Command::try_from(0x33).unwrap(), Command::UnlockAll);
    }
    
    #[test]
    fn test_response_conversion() {
        assert_eq!(u8::from(Response::StatusAll), 0x36);
        assert_eq!(Response::try_from(0x38).unwrap(), Response::UnlockTime);
    }
    
    #[test]
    fn test_expected_response() {
        assert_eq!(Command::UnlockOne.expected_response(), Some(Response::StatusSingle));
        assert_eq!(Command::GetStatus.expected_response(), Some(Response::StatusSingle));
        assert_eq!(Command::UnlockAll.expected_response(), Some(Response::StatusAll));
        assert_eq!(Command::GetAllBus.expected_response(), Some(Response::StatusAll));
        assert_eq!(Command::SetUnlockTime.expected_response(), Some(Response::UnlockTime));
        assert_eq!(Command::SetDelayOrBaud.expected_response(), None);
    }
    
    #[test]
    fn test_unknown_opcodes() {
        assert_eq!(Command::try_from(0x35), Err(Error::UnknownCommand(0x35)));
        assert_eq!(Response::try_from(0x30), Err(Error::UnexpectedOpcode(0x30)));
    }
    
    #[test]
    fn test_display() {
        assert_eq!(Command::UnlockOne.to_string(), "UNLOCK_ONE(0x31)");
        assert_eq!(Response::StatusSingle.to_string(), "STATUS_SINGLE(0x35)");
    }
}

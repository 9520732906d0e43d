//! Windows registry backend

use std::ptr;

use winapi::shared::minwindef::{BYTE, DWORD, HKEY};
use winapi::shared::winerror::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS};
use winapi::um::winnt::{
    KEY_ALL_ACCESS, REG_DWORD, REG_EXPAND_SZ, REG_MULTI_SZ, REG_OPTION_NON_VOLATILE, REG_QWORD,
    REG_SZ,
};
use winapi::um::winreg::{
    RegCloseKey, RegCreateKeyExW, RegDeleteKeyW, RegDeleteTreeW, RegDeleteValueW, RegOpenKeyExW,
    RegQueryValueExW, RegSetValueExW, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE,
};

use super::{HierarchicalStore, RegistryBackend, RegistryKey, RegistryNode};
use crate::error::{ConfigError, Result};

/// Null-terminated UTF-16 copy of `s` for the wide registry API.
fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn is_not_found(status: i32) -> bool {
    status as DWORD == ERROR_FILE_NOT_FOUND
}

fn check(op: &'static str, status: i32) -> Result<()> {
    if status as DWORD == ERROR_SUCCESS {
        Ok(())
    } else {
        Err(ConfigError::Registry { op, code: status })
    }
}

fn utf16_units(data: &[u8]) -> Vec<u16> {
    data.chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Render raw registry data as text.
fn render_value(value_type: DWORD, data: &[u8]) -> String {
    match value_type {
        REG_SZ | REG_EXPAND_SZ => String::from_utf16_lossy(&utf16_units(data))
            .trim_end_matches('\0')
            .to_string(),
        REG_MULTI_SZ => String::from_utf16_lossy(&utf16_units(data))
            .split('\0')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        REG_DWORD if data.len() >= 4 => {
            u32::from_le_bytes([data[0], data[1], data[2], data[3]]).to_string()
        }
        REG_QWORD if data.len() >= 8 => {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&data[..8]);
            u64::from_le_bytes(bytes).to_string()
        }
        _ => data.iter().map(|b| format!("{:02x}", b)).collect(),
    }
}

/// Source of the predefined `HKEY_CURRENT_USER` and `HKEY_LOCAL_MACHINE` roots.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsRegistry;

impl RegistryBackend for WindowsRegistry {
    type Key = WinKey;

    fn root(&self, node: RegistryNode) -> Result<WinKey> {
        let hkey = match node {
            RegistryNode::CurrentUser => HKEY_CURRENT_USER,
            RegistryNode::LocalMachine => HKEY_LOCAL_MACHINE,
        };
        // Predefined keys are never closed
        Ok(WinKey { hkey, owned: false })
    }
}

/// An open registry key handle, closed on drop.
#[derive(Debug)]
pub struct WinKey {
    hkey: HKEY,
    owned: bool,
}

impl Drop for WinKey {
    fn drop(&mut self) {
        if self.owned {
            unsafe {
                RegCloseKey(self.hkey);
            }
        }
    }
}

impl RegistryKey for WinKey {
    fn create_subkey(&self, name: &str) -> Result<Self> {
        let wide_name = wide(name);
        let mut hkey: HKEY = ptr::null_mut();
        let status = unsafe {
            RegCreateKeyExW(
                self.hkey,
                wide_name.as_ptr(),
                0,
                ptr::null_mut(),
                REG_OPTION_NON_VOLATILE,
                KEY_ALL_ACCESS,
                ptr::null_mut(),
                &mut hkey,
                ptr::null_mut(),
            )
        };
        check("RegCreateKeyExW", status)?;
        Ok(WinKey { hkey, owned: true })
    }

    fn open_subkey(&self, name: &str) -> Result<Option<Self>> {
        let wide_name = wide(name);
        let mut hkey: HKEY = ptr::null_mut();
        let status =
            unsafe { RegOpenKeyExW(self.hkey, wide_name.as_ptr(), 0, KEY_ALL_ACCESS, &mut hkey) };
        if is_not_found(status) {
            return Ok(None);
        }
        check("RegOpenKeyExW", status)?;
        Ok(Some(WinKey { hkey, owned: true }))
    }

    fn get_value(&self, name: &str) -> Result<Option<String>> {
        let wide_name = wide(name);
        let mut value_type: DWORD = 0;
        let mut value_len: DWORD = 0;

        // First call to get the size
        let status = unsafe {
            RegQueryValueExW(
                self.hkey,
                wide_name.as_ptr(),
                ptr::null_mut(),
                &mut value_type,
                ptr::null_mut(),
                &mut value_len,
            )
        };
        if is_not_found(status) {
            return Ok(None);
        }
        check("RegQueryValueExW", status)?;

        let mut value_buf = vec![0u8; value_len as usize];
        let status = unsafe {
            RegQueryValueExW(
                self.hkey,
                wide_name.as_ptr(),
                ptr::null_mut(),
                &mut value_type,
                value_buf.as_mut_ptr() as *mut BYTE,
                &mut value_len,
            )
        };
        check("RegQueryValueExW", status)?;
        value_buf.truncate(value_len as usize);
        Ok(Some(render_value(value_type, &value_buf)))
    }

    fn set_value(&self, name: &str, value: &str) -> Result<()> {
        let wide_name = wide(name);
        let data: Vec<u8> = wide(value).into_iter().flat_map(u16::to_le_bytes).collect();
        let status = unsafe {
            RegSetValueExW(
                self.hkey,
                wide_name.as_ptr(),
                0,
                REG_SZ,
                data.as_ptr() as *const BYTE,
                data.len() as DWORD,
            )
        };
        check("RegSetValueExW", status)
    }

    fn delete_value(&self, name: &str) -> Result<()> {
        let wide_name = wide(name);
        let status = unsafe { RegDeleteValueW(self.hkey, wide_name.as_ptr()) };
        if is_not_found(status) {
            return Ok(());
        }
        check("RegDeleteValueW", status)
    }

    fn delete_subkey(&self, name: &str) -> Result<()> {
        let wide_name = wide(name);
        let status = unsafe { RegDeleteKeyW(self.hkey, wide_name.as_ptr()) };
        if is_not_found(status) {
            return Err(ConfigError::KeyNotFound(name.to_string()));
        }
        check("RegDeleteKeyW", status)
    }

    fn delete_subkey_tree(&self, name: &str) -> Result<()> {
        let wide_name = wide(name);
        let status = unsafe { RegDeleteTreeW(self.hkey, wide_name.as_ptr()) };
        if is_not_found(status) {
            return Err(ConfigError::KeyNotFound(name.to_string()));
        }
        check("RegDeleteTreeW", status)
    }
}

impl HierarchicalStore<WinKey> {
    /// Open a store backed by the system registry.
    pub fn open_system(company: Option<&str>, product: &str, node: RegistryNode) -> Result<Self> {
        HierarchicalStore::open(&WindowsRegistry, company, product, node)
    }
}
